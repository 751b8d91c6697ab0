use crate::polycl_setup_error;
use crate::utils::err::*;

use tracing::info;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

// The rendered text of the three generated files.
#[derive(Clone, Debug, PartialEq)]
pub struct Rendered {
    pub host: String,
    pub kernel: String,
    pub header: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OutputNames {
    pub host: PathBuf,
    pub kernel: PathBuf,
    pub header: PathBuf,
}

fn with_suffix(base: &Path, suffix: &str) -> CompileResult<PathBuf> {
    match base.file_name().and_then(|s| s.to_str()) {
        Some(name) => Ok(base.with_file_name(format!("{name}{suffix}"))),
        None => polycl_setup_error!("cannot derive output names from {0}", base.display()),
    }
}

impl OutputNames {
    // Derives the names of the generated files from the input file and an optional output file.
    // The host code is written to the output file when one is given. Otherwise, all files are
    // named after the input file, but placed in the current directory.
    pub fn derive(input: &str, output: Option<&str>) -> CompileResult<OutputNames> {
        let (base, host) = match output {
            Some(out) => {
                let out = PathBuf::from(out);
                (out.with_extension(""), Some(out))
            },
            None => {
                let stem = Path::new(input).file_stem().map(PathBuf::from);
                match stem {
                    Some(stem) => (stem, None),
                    None => {
                        return polycl_setup_error!("cannot derive output names from {input}");
                    }
                }
            }
        };
        let host = match host {
            Some(h) => h,
            None => with_suffix(&base, "_host.c")?,
        };
        Ok(OutputNames {
            host,
            kernel: with_suffix(&base, "_kernel.cl")?,
            header: with_suffix(&base, "_kernel.h")?,
        })
    }

    pub fn kernel_path(&self) -> String {
        self.kernel.display().to_string()
    }

    // The header is included by the host file, which is placed in the same directory, so we
    // refer to it by its file name only.
    pub fn header_name(&self) -> String {
        self.header.file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    fn paths(&self) -> [&PathBuf; 3] {
        [&self.host, &self.kernel, &self.header]
    }

    // The file each artifact is written to before it is moved into place.
    pub fn staging_path(p: &Path) -> PathBuf {
        let mut s = p.as_os_str().to_os_string();
        s.push(".tmp");
        PathBuf::from(s)
    }

    fn remove_all(paths: &[PathBuf]) {
        for p in paths {
            let _ = fs::remove_file(p);
        }
    }

    fn write_staged(path: &Path, text: &str) -> CompileResult<()> {
        let res = fs::File::create(path)
            .and_then(|mut f| f.write_all(text.as_bytes()).and_then(|_| f.flush()));
        match res {
            Ok(()) => Ok(()),
            Err(e) => polycl_setup_error!("cannot write {0}: {e}", path.display()),
        }
    }

    // Writes the rendered files. All three are first written next to their destination and only
    // moved into place once every write succeeded, so a failed write leaves earlier output
    // untouched.
    pub fn write(&self, rendered: &Rendered) -> CompileResult<()> {
        let contents = [&rendered.host, &rendered.kernel, &rendered.header];
        let staged = self.paths().iter()
            .map(|p| OutputNames::staging_path(p))
            .collect::<Vec<PathBuf>>();
        for (i, (tmp, text)) in staged.iter().zip(contents).enumerate() {
            if let Err(e) = OutputNames::write_staged(tmp, text) {
                OutputNames::remove_all(&staged[..=i]);
                return Err(e);
            }
        }
        let targets = self.paths().into_iter().zip(contents);
        for (i, (tmp, (p, text))) in staged.iter().zip(targets).enumerate() {
            if let Err(e) = fs::rename(tmp, p) {
                OutputNames::remove_all(&staged[i..]);
                return polycl_setup_error!("cannot create {0}: {e}", p.display());
            }
            info!(path = %p.display(), bytes = text.len(), "wrote artifact");
        }
        Ok(())
    }
}
