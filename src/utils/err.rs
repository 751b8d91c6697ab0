use std::error;
use std::fmt;

#[derive(Clone, Debug, PartialEq)]
enum ErrorKind {
    Setup,
    Model,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ErrorKind::Setup => write!(f, "OpenCL codegen setup error"),
            ErrorKind::Model => write!(f, "Inconsistent program model"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CompileError {
    msg: String,
    kind: ErrorKind
}

impl CompileError {
    pub fn setup_err(msg: String) -> Self {
        CompileError {msg, kind: ErrorKind::Setup}
    }

    pub fn model_err(msg: String) -> Self {
        CompileError {msg, kind: ErrorKind::Model}
    }

    pub fn is_setup_error(&self) -> bool {
        self.kind == ErrorKind::Setup
    }

    pub fn is_model_error(&self) -> bool {
        self.kind == ErrorKind::Model
    }

    pub fn message<'a>(&'a self) -> &'a str {
        &self.msg
    }
}

impl error::Error for CompileError {}
impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{0}: {1}", self.kind, &self.msg)
    }
}

pub type CompileResult<T> = Result<T, CompileError>;

#[macro_export]
macro_rules! polycl_setup_error {
    ($($t:tt)*) => {{
        Err(CompileError::setup_err(format!($($t)*)))
    }}
}

#[macro_export]
macro_rules! polycl_model_error {
    ($i:expr,$($t:tt)*) => {{
        Err(CompileError::model_err($i.error_msg(format!($($t)*))))
    }}
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::utils::info::Origin;

    fn fail_model() -> CompileResult<()> {
        polycl_model_error!(Origin::Kernel {id: 3}, "unknown array {0}", "B")
    }

    #[test]
    fn model_error_includes_origin() {
        let e = fail_model().unwrap_err();
        assert!(e.is_model_error());
        assert_eq!(e.message(), "in kernel 3: unknown array B");
    }

    #[test]
    fn display_prefixes_kind() {
        let e = CompileError::setup_err("cannot open x.cl".to_string());
        assert_eq!(format!("{e}"), "OpenCL codegen setup error: cannot open x.cl");
    }

    #[test]
    fn setup_macro_has_no_origin() {
        let r: CompileResult<()> = polycl_setup_error!("Failed to open \"{0}\"", "a.c");
        let e = r.unwrap_err();
        assert!(e.is_setup_error());
        assert_eq!(e.message(), "Failed to open \"a.c\"");
    }
}
