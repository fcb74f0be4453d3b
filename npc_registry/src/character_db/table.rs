//! Loading the character database from CSV.

use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use super::CharacterRecord;
use crate::error::{RegistryError, Result};
use crate::game::GameKind;

/// Columns every character table must provide.
pub const REQUIRED_COLUMNS: [&str; 4] = ["base_id", "name", "race", "voice_model"];

/// A single row of the character database.
///
/// Unknown columns are ignored; missing optional cells read as empty. The
/// voice folder comes from the title's own column (`skyrim_voice_folder`,
/// `fallout4_voice_folder`) when that cell is filled, else from `voice_folder`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CharacterRow {
    #[serde(default)]
    pub base_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub race: String,
    #[serde(default)]
    pub voice_model: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub advanced_voice_model: String,
    #[serde(default)]
    pub voice_folder: String,
}

impl CharacterRow {
    pub fn new(
        base_id: impl Into<String>,
        name: impl Into<String>,
        race: impl Into<String>,
        voice_model: impl Into<String>,
    ) -> Self {
        Self {
            base_id: base_id.into(),
            name: name.into(),
            race: race.into(),
            voice_model: voice_model.into(),
            ..Default::default()
        }
    }

    /// Set the biography.
    pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = bio.into();
        self
    }

    /// Convert the row into the profile handed to conversations.
    pub fn to_record(&self) -> CharacterRecord {
        CharacterRecord {
            name: self.name.clone(),
            bio: self.bio.clone(),
            voice_model: self.voice_model.clone(),
            advanced_voice_model: self.advanced_voice_model.clone(),
            voice_folder: self.voice_folder.clone(),
            base_id: Some(self.base_id.clone()),
            race: Some(self.race.clone()),
        }
    }
}

/// The in-memory character database. Read-only once loaded.
#[derive(Debug, Clone, Default)]
pub struct CharacterTable {
    rows: Vec<CharacterRow>,
}

impl CharacterTable {
    /// Build a table from rows, dropping rows without a voice model.
    pub fn from_rows(rows: impl IntoIterator<Item = CharacterRow>) -> Self {
        Self {
            rows: rows
                .into_iter()
                .filter(|row| !row.voice_model.trim().is_empty())
                .collect(),
        }
    }

    /// Load the table for a game title from a CSV file.
    pub fn load(path: impl AsRef<Path>, game: GameKind) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let text = std::str::from_utf8(&bytes).map_err(|e| RegistryError::Encoding {
            path: path.to_path_buf(),
            valid_up_to: e.valid_up_to(),
        })?;
        Self::from_csv_str(text, path, game)
    }

    /// Parse CSV text. `source` only labels error messages.
    pub fn from_csv_str(text: &str, source: impl Into<PathBuf>, game: GameKind) -> Result<Self> {
        let path = source.into();
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(text.as_bytes());

        let headers = reader
            .headers()
            .map_err(|source| RegistryError::Csv {
                path: path.clone(),
                source,
            })?
            .clone();
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == column) {
                return Err(RegistryError::MissingColumn { path, column });
            }
        }
        let title_folder = headers
            .iter()
            .position(|h| h == game.voice_folder_column());

        let mut rows = Vec::new();
        for record in reader.records() {
            let csv_error = |source: csv::Error| RegistryError::Csv {
                path: path.clone(),
                source,
            };
            let record = record.map_err(csv_error)?;
            let mut row: CharacterRow = record.deserialize(Some(&headers)).map_err(csv_error)?;
            if let Some(folder) = title_folder
                .and_then(|i| record.get(i))
                .map(str::trim)
                .filter(|folder| !folder.is_empty())
            {
                row.voice_folder = folder.to_string();
            }
            rows.push(row);
        }

        let total = rows.len();
        let table = Self::from_rows(rows);
        tracing::debug!(
            path = %path.display(),
            %game,
            rows = table.len(),
            dropped = total - table.len(),
            "Loaded character table"
        );
        Ok(table)
    }

    /// Load the table, or report the failure to the operator and terminate.
    ///
    /// A missing or malformed character table leaves nothing to resolve NPCs
    /// against, so the process waits for the operator to acknowledge the
    /// message before exiting with status 1.
    pub fn load_or_exit(path: impl AsRef<Path>, game: GameKind) -> Self {
        match Self::load(path, game) {
            Ok(table) => table,
            Err(err) => {
                tracing::error!("{err}");
                let stdin = std::io::stdin();
                let mut stdout = std::io::stdout();
                // The process exits either way.
                let _ = wait_for_operator(&mut stdin.lock(), &mut stdout, &err);
                std::process::exit(1);
            }
        }
    }

    /// All rows in file order.
    pub fn rows(&self) -> &[CharacterRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Print a fatal diagnostic and block until the operator presses Enter.
pub fn wait_for_operator<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    err: &RegistryError,
) -> std::io::Result<()> {
    writeln!(output, "{err}")?;
    write!(output, "Press Enter to exit.")?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
name,voice_model,bio,base_id,race,skyrim_voice_folder
Lydia,FemaleEvenToned,Housecarl of Whiterun.,A2C94,Nord,FemaleEvenToned
Faendal,MaleEvenToned,A Bosmer archer in Riverwood.,1348B,Wood Elf,
Ghost,,Nobody hears it.,99999,Nord,
";

    #[test]
    fn test_parse_drops_rows_without_voice_model() {
        let table = CharacterTable::from_csv_str(TABLE, "test.csv", GameKind::Skyrim).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].name, "Lydia");
        assert_eq!(table.rows()[1].bio, "A Bosmer archer in Riverwood.");
    }

    #[test]
    fn test_voice_folder_from_title_column() {
        let table = CharacterTable::from_csv_str(TABLE, "test.csv", GameKind::SkyrimVr).unwrap();

        assert_eq!(table.rows()[0].voice_folder, "FemaleEvenToned");
        assert!(table.rows()[1].voice_folder.is_empty());
        assert_eq!(table.rows()[0].to_record().voice_folder, "FemaleEvenToned");
    }

    #[test]
    fn test_voice_folder_ignores_other_titles() {
        let table = CharacterTable::from_csv_str(TABLE, "test.csv", GameKind::Fallout4).unwrap();
        assert!(table.rows()[0].voice_folder.is_empty());
    }

    #[test]
    fn test_title_voice_folder_overrides_generic_column() {
        let text = "\
base_id,name,race,voice_model,voice_folder,fallout4_voice_folder
1CA7D,Piper,Human,FemaleBoston,FemaleGeneric,FemaleBoston
2F1F,Preston,Human,MaleBoston,MaleGeneric,
";
        let table = CharacterTable::from_csv_str(text, "fo4.csv", GameKind::Fallout4).unwrap();

        assert_eq!(table.rows()[0].voice_folder, "FemaleBoston");
        assert_eq!(table.rows()[1].voice_folder, "MaleGeneric");
    }

    #[test]
    fn test_missing_required_column() {
        let text = "name,race\nLydia,Nord\n";
        let err = CharacterTable::from_csv_str(text, "broken.csv", GameKind::Skyrim).unwrap_err();
        assert!(matches!(err, RegistryError::MissingColumn { column: "base_id", .. }));
    }

    #[test]
    fn test_byte_order_mark_is_ignored() {
        let text = format!("\u{feff}{}", TABLE);
        let table = CharacterTable::from_csv_str(&text, "bom.csv", GameKind::Skyrim).unwrap();
        assert_eq!(table.rows()[0].base_id, "A2C94");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(TABLE.as_bytes()).unwrap();

        let table = CharacterTable::load(file.path(), GameKind::Skyrim).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_load_rejects_invalid_utf8() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"base_id,name,race,voice_model\n1,Ma\xefl,Nord,MaleNord\n")
            .unwrap();

        let err = CharacterTable::load(file.path(), GameKind::Skyrim).unwrap_err();
        assert!(matches!(err, RegistryError::Encoding { .. }));
        assert!(err.to_string().contains("encoding"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = CharacterTable::load("does/not/exist.csv", GameKind::Skyrim).unwrap_err();
        assert!(matches!(err, RegistryError::Io { .. }));
    }

    #[test]
    fn test_wait_for_operator() {
        let err = RegistryError::MissingColumn {
            path: PathBuf::from("skyrim_characters.csv"),
            column: "name",
        };
        let mut input = std::io::Cursor::new(b"\n".to_vec());
        let mut output = Vec::new();

        wait_for_operator(&mut input, &mut output, &err).unwrap();

        let printed = String::from_utf8(output).unwrap();
        assert!(printed.contains("skyrim_characters.csv"));
        assert!(printed.ends_with("Press Enter to exit."));
    }
}
