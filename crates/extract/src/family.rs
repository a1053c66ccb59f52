//! Participant table file families.
//!
//! One behavioral task run writes several files that share a stem:
//!
//! ```text
//! 00012345-1_emoreg.csv         <- primary
//! 00012345-1_emoreg.psydat
//! 00012345-1_emoreg.log
//! 00012345-1_emoreg.xlsx
//! 00012345-1_emoregblocks.csv
//! ```
//!
//! Only the primary (a plain `.csv`) is ever parsed; the others reuse its
//! metadata. A folder is only treated this way when it contains at least one
//! `.psydat` file.

use std::path::{Path, PathBuf};

/// Family suffixes, most specific first (`blocks.csv` must be tried before
/// `.csv`).
pub const FAMILY_SUFFIXES: [&str; 5] = [BLOCKS_SUFFIX, ".log", ".psydat", ".xlsx", PRIMARY_SUFFIX];
pub const PRIMARY_SUFFIX: &str = ".csv";
const BLOCKS_SUFFIX: &str = "blocks.csv";
const INDICATOR_EXTENSION: &str = "psydat";

/// Where a file stands within its family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Member {
    Primary,
    /// Secondary file, along with the path its primary is expected at.
    Secondary { primary: PathBuf },
}

/// Work out a file's family membership from its name alone.
///
/// Returns `None` for files with none of the family suffixes. `path` is
/// matched as given, so a compressed file must be passed by its content path.
///
/// # Examples
///
/// ```
/// use sift_extract::family::{Member, member};
/// use std::path::PathBuf;
///
/// assert_eq!(member("visit1/00012345-1_emoreg.csv"), Some(Member::Primary));
/// assert_eq!(
///     member("visit1/00012345-1_emoregblocks.csv"),
///     Some(Member::Secondary { primary: PathBuf::from("visit1/00012345-1_emoreg.csv") })
/// );
/// assert_eq!(member("ex12345/physio.txt"), None);
/// ```
pub fn member(path: impl AsRef<Path>) -> Option<Member> {
    let path = path.as_ref();
    let name = path.to_str()?;
    let suffix = FAMILY_SUFFIXES.iter().find(|suffix| name.ends_with(*suffix))?;
    if *suffix == PRIMARY_SUFFIX {
        return Some(Member::Primary);
    }
    let stem = &name[..name.len() - suffix.len()];
    Some(Member::Secondary {
        primary: PathBuf::from(format!("{stem}{PRIMARY_SUFFIX}")),
    })
}

/// Whether this file switches a folder into family mode.
pub fn is_indicator(path: impl AsRef<Path>) -> bool {
    path.as_ref().extension().is_some_and(|ext| ext == INDICATOR_EXTENSION)
}
