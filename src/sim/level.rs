//! Level sources and the text decipherer
//!
//! A source yields a grid of optional cell descriptors, top row first, plus
//! an optional non-fatal diagnostic. The generator only depends on that
//! contract; `TextLevel` is the built-in ASCII implementation.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::entity::PlatformRole;
use crate::error::{LevelError, Result};
use crate::settings::Difficulty;

/// What a single grid cell holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellKind {
    Platform(PlatformRole),
    Player,
}

impl CellKind {
    pub fn from_glyph(glyph: char) -> Option<Option<Self>> {
        match glyph {
            '.' | ' ' => Some(None),
            '#' => Some(Some(CellKind::Platform(PlatformRole::Inert))),
            '=' => Some(Some(CellKind::Platform(PlatformRole::Moving))),
            '^' => Some(Some(CellKind::Platform(PlatformRole::LevelChange))),
            'P' => Some(Some(CellKind::Player)),
            _ => None,
        }
    }
}

/// Rows of optional cells as produced by a decipherer (top row first).
///
/// Every row has the same number of columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelGrid {
    rows: Vec<Vec<Option<CellKind>>>,
}

impl LevelGrid {
    /// Build from rows, right-padding ragged rows with empty cells.
    /// Returns whether any padding happened.
    pub fn from_rows(mut rows: Vec<Vec<Option<CellKind>>>) -> (Self, bool) {
        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut padded = false;
        for row in &mut rows {
            if row.len() < columns {
                row.resize(columns, None);
                padded = true;
            }
        }
        (Self { rows }, padded)
    }

    pub fn rows(&self) -> &[Vec<Option<CellKind>>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|r| r.iter().all(Option::is_none))
    }
}

/// Non-fatal problem reported alongside a still-usable grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeciphererDiagnostic {
    pub messages: Vec<String>,
}

impl fmt::Display for DeciphererDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.messages.join("; "))
    }
}

/// Decipherer output
#[derive(Debug, Clone, PartialEq)]
pub struct Deciphered {
    pub grid: LevelGrid,
    pub diagnostic: Option<DeciphererDiagnostic>,
}

/// Anything that can produce a level grid
pub trait LevelSource {
    fn name(&self) -> &str;
    fn decipher(&self) -> Deciphered;
}

/// ASCII level map, top row first.
///
/// `.`/space empty, `#` platform, `=` moving platform, `^` level-change
/// platform, `P` player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLevel {
    name: String,
    text: String,
}

impl TextLevel {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

impl LevelSource for TextLevel {
    fn name(&self) -> &str {
        &self.name
    }

    fn decipher(&self) -> Deciphered {
        let mut messages = Vec::new();
        // Blank lines around the map are layout; blank lines inside it are empty rows
        let lines: Vec<&str> = self.text.lines().collect();
        let first = lines.iter().position(|line| !line.trim().is_empty());
        let last = lines.iter().rposition(|line| !line.trim().is_empty());
        let body = match (first, last) {
            (Some(first), Some(last)) => &lines[first..=last],
            _ => &[][..],
        };

        let rows: Vec<Vec<Option<CellKind>>> = body
            .iter()
            .enumerate()
            .map(|(r, line)| {
                line.chars()
                    .enumerate()
                    .map(|(c, glyph)| {
                        CellKind::from_glyph(glyph).unwrap_or_else(|| {
                            messages.push(format!("unknown glyph {glyph:?} at row {r} column {c}"));
                            None
                        })
                    })
                    .collect::<Vec<_>>()
            })
            .collect();

        let (grid, padded) = LevelGrid::from_rows(rows);
        if padded {
            messages.push(format!("ragged rows padded to {} columns", grid.column_count()));
        }

        Deciphered {
            grid,
            diagnostic: (!messages.is_empty()).then_some(DeciphererDiagnostic { messages }),
        }
    }
}

/// Counter-derived level identifier, `"<difficulty>-0<N>"`
pub fn level_name(difficulty: Difficulty, number: u32) -> String {
    format!("{}-0{}", difficulty.as_str(), number)
}

const EASY_01: &str = "
..........
....^^....
..........
.##....##.
..........
....==....
..........
##......##
..........
...####...
....P.....
##########
";

const EASY_02: &str = "
.......^^.
..........
..##......
..........
.....==...
..........
#.........
..........
...###....
..........
.......##.
....P.....
##########
";

const EASY_03: &str = "
^^........
..........
...==.....
..........
......##..
..........
.##.......
..........
....====..
..........
.P........
##########
";

/// Named level sources
#[derive(Debug, Clone, Default)]
pub struct LevelLibrary {
    levels: BTreeMap<String, TextLevel>,
}

impl LevelLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// The levels shipped with the game
    pub fn builtin() -> Self {
        let mut library = Self::new();
        for (n, text) in [EASY_01, EASY_02, EASY_03].into_iter().enumerate() {
            let name = level_name(Difficulty::Easy, n as u32 + 1);
            library.insert(TextLevel::new(name, text));
        }
        library
    }

    /// Add every `*.txt` file in `dir`, named by file stem
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize> {
        let io_err = |source| LevelError::Io {
            path: dir.to_path_buf(),
            source,
        };
        let mut added = 0;
        for entry in std::fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("txt") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let text = std::fs::read_to_string(&path).map_err(|source| LevelError::Io {
                path: path.clone(),
                source,
            })?;
            self.insert(TextLevel::new(stem, text));
            added += 1;
        }
        log::info!("Loaded {} level files from {}", added, dir.display());
        Ok(added)
    }

    pub fn insert(&mut self, level: TextLevel) {
        self.levels.insert(level.name.clone(), level);
    }

    pub fn get(&self, name: &str) -> Result<&TextLevel> {
        self.levels
            .get(name)
            .ok_or_else(|| LevelError::UnknownLevel(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.levels.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_level_deciphers_glyphs() {
        let level = TextLevel::new("t", "P.\n#=^\n");
        let out = level.decipher();
        assert!(out.diagnostic.is_some()); // first row padded
        let rows = out.grid.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(out.grid.column_count(), 3);
        assert_eq!(rows[0], vec![Some(CellKind::Player), None, None]);
        assert_eq!(
            rows[1],
            vec![
                Some(CellKind::Platform(PlatformRole::Inert)),
                Some(CellKind::Platform(PlatformRole::Moving)),
                Some(CellKind::Platform(PlatformRole::LevelChange)),
            ]
        );
    }

    #[test]
    fn test_unknown_glyph_is_diagnostic_not_failure() {
        let out = TextLevel::new("t", "#x#\n").decipher();
        let diag = out.diagnostic.expect("diagnostic");
        assert!(diag.to_string().contains("'x'"));
        assert_eq!(out.grid.rows()[0][1], None);
        assert_eq!(out.grid.rows()[0].len(), 3);
    }

    #[test]
    fn test_clean_level_has_no_diagnostic() {
        let library = LevelLibrary::builtin();
        for n in 1..=3 {
            let level = library.get(&level_name(Difficulty::Easy, n)).unwrap();
            let out = level.decipher();
            assert_eq!(out.diagnostic, None, "{}", level.name());
            assert!(!out.grid.is_empty());
        }
    }

    #[test]
    fn test_level_name_pattern() {
        assert_eq!(level_name(Difficulty::Easy, 1), "easy-01");
        assert_eq!(level_name(Difficulty::Hard, 3), "hard-03");
    }

    #[test]
    fn test_only_outer_blank_lines_are_dropped() {
        let out = TextLevel::new("t", "\n\n#\n  \n\nP\n\n").decipher();
        assert_eq!(out.grid.row_count(), 4);
        assert_eq!(out.grid.rows()[0], vec![Some(CellKind::Platform(PlatformRole::Inert)), None]);
        assert!(out.grid.rows()[1..3].iter().flatten().all(Option::is_none));
        assert_eq!(out.grid.rows()[3][0], Some(CellKind::Player));
    }

    fn scratch_dir(tag: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("darkrise-{}-{}", tag, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_load_dir_reads_txt_files() {
        let dir = scratch_dir("levels");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("easy-04.txt"), "P.\n##\n").unwrap();
        std::fs::write(dir.join("notes.md"), "not a level").unwrap();

        let mut library = LevelLibrary::builtin();
        let added = library.load_dir(&dir).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        assert_eq!(added, 1);
        assert_eq!(library.len(), 4);
        assert!(!library.contains("notes"));
        let level = library.get("easy-04").unwrap();
        assert_eq!(level.decipher().grid.row_count(), 2);
    }

    #[test]
    fn test_load_dir_missing_is_io_error() {
        let dir = scratch_dir("missing");
        let mut library = LevelLibrary::new();
        let err = library.load_dir(&dir).unwrap_err();
        assert!(matches!(err, LevelError::Io { ref path, .. } if *path == dir));
        assert!(library.is_empty());
    }

    #[test]
    fn test_unknown_level() {
        let library = LevelLibrary::builtin();
        assert!(matches!(
            library.get("easy-09"),
            Err(LevelError::UnknownLevel(name)) if name == "easy-09"
        ));
    }
}
