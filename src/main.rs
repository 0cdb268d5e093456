use justhttp::core;
use justhttp::signals;
use justhttp::status::ExitStatus;
use std::sync::atomic::{AtomicBool, Ordering};

/// Entry point - catches Ctrl+C and calls core::run()
fn main() -> ExitStatus {
    // The first Ctrl+C cancels the request so destructors still run
    ctrlc::set_handler(move || {
        signals::set_interrupted();
        eprintln!();

        static SECOND_CTRL_C: AtomicBool = AtomicBool::new(false);
        if SECOND_CTRL_C.swap(true, Ordering::SeqCst) {
            std::process::exit(ExitStatus::Interrupted as i32);
        }
    })
    .ok();

    let args: Vec<String> = std::env::args().collect();
    let status = core::run(args);

    if signals::was_interrupted() {
        return ExitStatus::Interrupted;
    }

    status
}
