use tracing::error;

pub fn report_and_panic<Err: core::fmt::Display>(error: Err, message: &str) -> ! {
    error!("{message}: {error}");

    #[cfg(windows)]
    {
        use windows::Win32::UI::WindowsAndMessaging::{MB_ICONERROR, MB_OK, MB_SETFOREGROUND};

        use crate::utilities::windows_helpers::display_message;

        let user_message = format!(
            "ERROR:\n{message}.\nSee the logs for more details, the application will exit."
        );
        display_message(&user_message, MB_ICONERROR | MB_OK | MB_SETFOREGROUND);
    }

    panic!("{message}: {error}");
}

pub trait Failure<T> {
    fn report_and_panic(self, message: &str) -> T;
}

impl<T, E: core::fmt::Display> Failure<T> for Result<T, E> {
    fn report_and_panic(self, message: &str) -> T {
        match self {
            Ok(value) => value,
            Err(error) => report_and_panic(error, message),
        }
    }
}

impl<T> Failure<T> for Option<T> {
    fn report_and_panic(self, message: &str) -> T {
        match self {
            Some(value) => value,
            None => report_and_panic("Was None", message),
        }
    }
}
