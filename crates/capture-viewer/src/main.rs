//! # Capture Viewer
//! Shows a live capture of a monitor or window in a composition backed window.
//!

#![allow(clippy::std_instead_of_alloc)]

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[cfg(windows)]
mod app;
#[cfg(any(windows, test))]
#[cfg_attr(not(windows), allow(dead_code))]
mod config;
#[cfg(windows)]
mod logger;
#[cfg(windows)]
mod target;
#[cfg(any(windows, test))]
#[cfg_attr(not(windows), allow(dead_code))]
mod utilities;

/// The Cargo package version.
#[cfg(all(windows, not(debug_assertions)))]
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The Cargo package version or '0.0.0' if a non-release build.
#[cfg(all(windows, debug_assertions))]
pub const VERSION: &str = "0.0.0";

/// If this instance should have debug enabled.
#[cfg(windows)]
pub fn should_debug() -> bool {
    std::env::args().any(|arg| arg.eq("--debug"))
}

#[cfg(windows)]
fn main() {
    use tracing::{info, info_span, warn};
    use windows::Win32::UI::WindowsAndMessaging::{
        IDNO, IDYES, MB_DEFBUTTON2, MB_ICONWARNING, MB_SETFOREGROUND, MB_YESNO,
    };
    use winit::event_loop::{ControlFlow, EventLoop};

    use app::App;
    use config::Config;
    use logger::setup_logger;
    use utilities::{
        failure::{Failure, report_and_panic},
        windows_helpers::display_message,
    };

    // Set up logger
    let _logger_guards =
        setup_logger(should_debug()).report_and_panic("The logger could not be set up");

    // Log application start
    let _span = info_span!("[Main Thread]").entered();
    info!("Capture Viewer v{}", VERSION);

    // Load config
    let config = {
        let maybe_config = match Config::try_load_config() {
            Ok(maybe_config) => maybe_config,
            Err(error) => {
                warn!("Could not deserialize config file:\n{error}");
                let action = display_message(
                    "Your config file is invalid.\nMore details are in the logs.\n\nClear and reset your config file?",
                    MB_SETFOREGROUND | MB_YESNO | MB_ICONWARNING | MB_DEFBUTTON2,
                );

                match action {
                    IDYES => {
                        info!("Resetting config file.");
                        None
                    }

                    IDNO => {
                        warn!("Exiting: Invalid config.");
                        return;
                    }

                    value => report_and_panic(
                        format!("Message box returned an unexpected response: {value:?}"),
                        "Message box returned an unexpected response",
                    ),
                }
            }
        };

        match maybe_config {
            Some(config) => config,
            None => {
                let config = Config::default();
                config.save();
                config
            }
        }
    };

    // Create event loop
    let event_loop = EventLoop::new().report_and_panic("Could not create the event loop");
    event_loop.set_control_flow(ControlFlow::Wait);

    // Run the app
    let mut app = App::new(config);
    event_loop
        .run_app(&mut app)
        .report_and_panic("The event loop exited with an error");

    info!("Exiting");
}

#[cfg(not(windows))]
fn main() {
    eprintln!("Capture Viewer only runs on Windows");
}
