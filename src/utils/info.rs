use std::fmt;

// The origin of a part of the program model, used to point error messages at the offending kernel,
// array, or staging variable instead of at a source file position.
#[derive(Clone, Debug, PartialEq)]
pub enum Origin {
    Program,
    Array {name: String},
    Kernel {id: usize},
    StagingVar {kernel: usize, name: String},
}

impl Origin {
    pub fn array(name: &str) -> Origin {
        Origin::Array {name: name.to_string()}
    }

    pub fn staging_var(kernel: usize, name: &str) -> Origin {
        Origin::StagingVar {kernel, name: name.to_string()}
    }

    pub fn error_msg(&self, msg: String) -> String {
        match self {
            Origin::Program => msg,
            _ => format!("in {self}: {msg}")
        }
    }
}

impl Default for Origin {
    fn default() -> Origin {
        Origin::Program
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Origin::Program => write!(f, "program"),
            Origin::Array {name} => write!(f, "array {name}"),
            Origin::Kernel {id} => write!(f, "kernel {id}"),
            Origin::StagingVar {kernel, name} => {
                write!(f, "staging variable {name} of kernel {kernel}")
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn program_origin_leaves_message_untouched() {
        let s = Origin::default().error_msg("x".to_string());
        assert_eq!(s, "x");
    }

    #[test]
    fn staging_var_origin_names_kernel() {
        let s = Origin::staging_var(2, "shared_A").error_msg("bad extent".to_string());
        assert_eq!(s, "in staging variable shared_A of kernel 2: bad extent");
    }
}
