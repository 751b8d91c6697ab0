#[derive(Clone, Debug)]
pub struct CompileOptions {
    ////////////////
    // HOST FLAGS //
    ////////////////

    // Passed to the runtime-support device selection routine in the generated host code. When
    // set, a GPU device is preferred over other OpenCL devices.
    pub use_gpu: bool,

    // Additional options passed to the OpenCL compiler when the host program builds the kernel
    // module at runtime.
    pub compiler_options: Option<String>,

    // When set, the generated host code is wrapped in a function of this name taking the
    // parameters and arrays of the program. Otherwise, it is emitted as a bare block meant to be
    // spliced into the original source in place of the scheduled region.
    pub host_function: Option<String>,

    ///////////////////
    // CODEGEN FLAGS //
    ///////////////////

    // The C type used for loop iterators in host and kernel code, and for the host iterators
    // passed as kernel arguments.
    pub iterator_type: String,

    // Enable to log each generated artifact (together with the time spent generating it).
    pub debug_print: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            use_gpu: true,
            compiler_options: None,
            host_function: None,
            iterator_type: "int".to_string(),
            debug_print: false,
        }
    }
}

impl CompileOptions {
    pub fn use_gpu(mut self, v: bool) -> Self {
        self.use_gpu = v;
        self
    }

    pub fn compiler_options(mut self, s: &str) -> Self {
        self.compiler_options = Some(s.to_string());
        self
    }

    pub fn host_function(mut self, s: &str) -> Self {
        self.host_function = Some(s.to_string());
        self
    }

    pub fn iterator_type(mut self, s: &str) -> Self {
        self.iterator_type = s.to_string();
        self
    }

    pub fn debug_print(mut self, v: bool) -> Self {
        self.debug_print = v;
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let opts = CompileOptions::default();
        assert!(opts.use_gpu);
        assert_eq!(opts.compiler_options, None);
        assert_eq!(opts.iterator_type, "int");
    }

    #[test]
    fn chained_setters() {
        let opts = CompileOptions::default()
            .use_gpu(false)
            .compiler_options("-cl-fast-relaxed-math")
            .iterator_type("long");
        assert!(!opts.use_gpu);
        assert_eq!(opts.compiler_options.as_deref(), Some("-cl-fast-relaxed-math"));
        assert_eq!(opts.iterator_type, "long");
    }
}
