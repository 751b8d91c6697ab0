use crate::option::CompileOptions;

use std::time;

pub struct DebugEnv {
    debug_print: bool,
    start: time::Instant
}

impl DebugEnv {
    pub fn new(opts: &CompileOptions) -> DebugEnv {
        DebugEnv {
            debug_print: opts.debug_print,
            start: time::Instant::now()
        }
    }

    fn print_artifact_message(
        start: time::Instant,
        bounds: &str,
        msg: &str,
        code: &str
    ) -> String {
        let now = time::Instant::now();
        let t = now.duration_since(start).as_micros();
        format!("{0} {msg} (time: {1} us) {0}\n{2}", bounds, t, code)
    }

    pub fn print(&self, msg: &str, code: &str) {
        if self.debug_print {
            let bounds = "=".repeat(5);
            let s = DebugEnv::print_artifact_message(self.start, &bounds, msg, code);
            tracing::debug!(target: "polycl::artifact", "{s}");
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use regex::Regex;

    #[test]
    fn test_print_message() {
        let start = time::Instant::now();
        let s = DebugEnv::print_artifact_message(start, "=", "x", "int y;");
        let re = Regex::new(r"= x \(time: \d+ us\) =\nint y;").unwrap();
        assert!(re.is_match(&s));
    }

    #[test]
    fn disabled_env_prints_nothing() {
        let env = DebugEnv::new(&CompileOptions::default());
        assert!(!env.debug_print);
        env.print("host", "{}");
    }
}
