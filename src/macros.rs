use crossterm::tty::IsTty;

lazy_static! {
    pub static ref COLORS_ENABLED: bool = std::io::stderr().is_tty();
}

#[macro_export]
macro_rules! print_err {
    () => { eprintln!(""); };
    ($fmt:expr) => {
        if *crate::macros::COLORS_ENABLED {
            eprintln!(concat!("{}{}cmdgram: ", $fmt, "{}"),
                ::crossterm::style::SetAttribute(::crossterm::style::Attribute::Bold),
                ::crossterm::style::SetForegroundColor(::crossterm::style::Color::Yellow),
                ::crossterm::style::SetAttribute(::crossterm::style::Attribute::Reset));
        } else {
            eprintln!(concat!("cmdgram: ", $fmt));
        }
    };
    ($fmt:expr, $($arg:tt)*) => {
        if *crate::macros::COLORS_ENABLED {
            eprintln!(concat!("{}{}cmdgram: ", $fmt, "{}"),
                ::crossterm::style::SetAttribute(::crossterm::style::Attribute::Bold),
                ::crossterm::style::SetForegroundColor(::crossterm::style::Color::Yellow),
                $($arg)*,
                ::crossterm::style::SetAttribute(::crossterm::style::Attribute::Reset));
        } else {
            eprintln!(concat!("cmdgram: ", $fmt), $($arg)*);
        }
    };
}
