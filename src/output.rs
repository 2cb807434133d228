//! Writes encoded machine code to a file. No container header, no
//! section table (spec.md §6): the output is the raw instruction
//! stream, nothing else.
//!
//! Grounded on the teacher's `vex::write_file` scoped `BufWriter` +
//! `File::create` idiom, with the teacher's 12-byte length/offset
//! header dropped — this format has nothing to frame.

use crate::error::{CompileError, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Where the binary is meant to run. The two targets differ only in
/// file-open mode; the encoded content is byte-identical either way.
/// `Unix` sets owner-read/write/execute permission bits on the output
/// file, per spec. `BareMetal` leaves the default file mode alone —
/// there is no host process loader to invoke it through, so the
/// permission bits have no meaning for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Unix,
    BareMetal,
}

impl std::str::FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "unix" => Ok(Target::Unix),
            "baremetal" => Ok(Target::BareMetal),
            other => Err(format!(
                "unknown target {other:?}; expected \"unix\" or \"baremetal\""
            )),
        }
    }
}

pub fn write_flat_binary(path: &Path, bytes: &[u8], target: Target) -> Result<()> {
    let file = File::create(path).map_err(|source| CompileError::WriteOutput {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(bytes)
        .map_err(|source| CompileError::WriteOutput {
            path: path.to_path_buf(),
            source,
        })?;
    writer.flush().map_err(|source| CompileError::WriteOutput {
        path: path.to_path_buf(),
        source,
    })?;
    drop(writer);

    if target == Target::Unix {
        set_executable(path)?;
    }
    Ok(())
}

#[cfg(unix)]
fn set_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let file = File::open(path).map_err(|source| CompileError::WriteOutput {
        path: path.to_path_buf(),
        source,
    })?;
    let mut perms = file
        .metadata()
        .map_err(|source| CompileError::WriteOutput {
            path: path.to_path_buf(),
            source,
        })?
        .permissions();
    perms.set_mode(0o700);
    std::fs::set_permissions(path, perms).map_err(|source| CompileError::WriteOutput {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Read;

    #[test]
    fn writes_exact_bytes_with_no_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.out");
        let bytes = vec![0x93, 0x04, 0xA0, 0x00, 0x73, 0x00, 0x10, 0x00];
        write_flat_binary(&path, &bytes, Target::Unix).unwrap();

        let mut out = Vec::new();
        File::open(&path).unwrap().read_to_end(&mut out).unwrap();
        assert_eq!(out, bytes);
    }

    #[cfg(unix)]
    #[test]
    fn unix_target_sets_owner_rwx() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.out");
        write_flat_binary(&path, &[0x13, 0x00, 0x00, 0x00], Target::Unix).unwrap();

        let mode = File::open(&path).unwrap().metadata().unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o700);
    }

    #[test]
    fn target_from_str_rejects_unknown() {
        assert!("unix".parse::<Target>().is_ok());
        assert!("baremetal".parse::<Target>().is_ok());
        assert!("vxworks".parse::<Target>().is_err());
    }
}
