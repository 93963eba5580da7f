pub use crate::traits::Progress;

use log::LevelFilter;

/// Progress bar for long-running loops
///
/// A bar is only shown at the default `info` log level. On an attended
/// terminal it is drawn with `indicatif`, otherwise it is printed
/// line by line with `logbar`. Log output is muted until the bar is
/// finished.
pub struct ProgressBar {
    bar: Option<Bar>,
    muted_level: LevelFilter,
}

enum Bar {
    Terminal(indicatif::ProgressBar),
    Log(logbar::ProgressBar),
}

impl ProgressBar {
    /// A new progress bar with the given number of steps and message
    pub fn new(len: u64, message: &str) -> Self {
        if log::max_level() != LevelFilter::Info {
            return Self::hidden();
        }
        let bar = if console::Term::stderr().features().is_attended() {
            let bar = indicatif::ProgressBar::new(len);
            if let Ok(style) = indicatif::ProgressStyle::default_bar()
                .template("{bar:60.cyan/cyan} {msg} {pos}/{len} [{elapsed}]")
            {
                bar.set_style(style);
            }
            bar.set_message(message.to_owned());
            Bar::Terminal(bar)
        } else {
            eprintln!("{message}");
            let style = logbar::Style::new().indicator('█');
            Bar::Log(logbar::ProgressBar::with_style(len as usize, style))
        };
        let muted_level = log::max_level();
        // log lines would break the bar
        log::set_max_level(LevelFilter::Off);
        Self {
            bar: Some(bar),
            muted_level,
        }
    }

    /// A progress bar that shows nothing
    pub fn hidden() -> Self {
        Self {
            bar: None,
            muted_level: log::max_level(),
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.bar.is_none()
    }
}

impl Default for ProgressBar {
    fn default() -> Self {
        Self::hidden()
    }
}

impl Progress for ProgressBar {
    fn inc(&self, i: u64) {
        match &self.bar {
            Some(Bar::Terminal(bar)) => bar.inc(i),
            Some(Bar::Log(bar)) => bar.inc(i as usize),
            None => {}
        }
    }

    fn finish(&self) {
        let Some(bar) = &self.bar else {
            return;
        };
        match bar {
            Bar::Terminal(bar) => bar.finish(),
            Bar::Log(bar) => bar.finish(),
        }
        log::set_max_level(self.muted_level);
    }
}
