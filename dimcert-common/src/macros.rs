//! Macros and other utility code.

/// This should be used for every write to stdout.
#[macro_export]
macro_rules! write_to_stdout {
    ($($arg:tt)*) => ({
        use std::io::Write;
        match write!(std::io::stdout(), $($arg)*) {
            Ok(()) => (),
            // Don't panic on SIGPIPE.
            Err(ref err) if err.kind() == std::io::ErrorKind::BrokenPipe =>  std::process::exit(141),
            Err(ref err) =>  panic!("{}", err),
        };
    })
}

/// Implementation of log.
#[macro_export]
macro_rules! _log {
    ($verbosity:expr, $level:expr, $($arg:tt)*) => {
        if $crate::config::ENABLE_LOGGING && $level <= $verbosity
        {
            $crate::comment!($($arg)*);
        }
    }
}

/// Print a formatted message if the verbosity of `$flags` is at least `$level`.
#[macro_export]
macro_rules! log {
    ($flags:expr, $level:expr, $($arg:tt)*) => {
        $crate::_log!($flags.verbosity, $level, $($arg)*)
    };
}

/// Report a fatal error and exit.
#[macro_export]
macro_rules! die {
    ($($arg:tt)*) => ({
        let style = $crate::output::error_style();
        $crate::write_to_stdout!("{}", style.paint("Error: "));
        $crate::write_to_stdout!("{}\n", style.paint(&format!($($arg)*)));
        std::process::exit(2);
    })
}

/// An assertion that can be compiled out through `config::CHECK_INVARIANTS`.
#[macro_export]
macro_rules! invariant {
    ($($arg:tt)*) => ({
        if $crate::config::CHECK_INVARIANTS {
            assert!($($arg)*);
        }
    })
}

/// Like invariant, but for preconditions.
#[macro_export]
macro_rules! requires {
    ($($arg:tt)*) => ({
        if $crate::config::CHECK_PRECONDITIONS {
            assert!($($arg)*);
        }
    })
}

/// Print to stdout, prefixed by "c ".
#[macro_export]
macro_rules! comment {
    ($($arg:tt)*) => ({
        $crate::write_to_stdout!("c ");
        $crate::write_to_stdout!($($arg)*);
        $crate::write_to_stdout!("\n");
    })
}
