//! Terminal output for the postvote CLI
//!
//! Everything the binary prints for a human goes through [`Output`]; the
//! server's own events go through `tracing` instead. `--no-color` swaps the
//! glyphs for bracketed tags so the text stays greppable in CI logs.

use owo_colors::OwoColorize;

/// Kind of a one-line status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// A command finished.
    Ok,
    /// Informational, nothing to act on.
    Note,
    /// Printed to stderr.
    Fail,
}

impl Tone {
    fn plain_tag(self) -> &'static str {
        match self {
            Tone::Ok => "[ok]",
            Tone::Note => "[note]",
            Tone::Fail => "[fail]",
        }
    }
}

/// Human-facing printer; `colored` is fixed by `--no-color`.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    colored: bool,
}

impl Output {
    /// Plain tags when `colored` is false.
    pub fn new(colored: bool) -> Self {
        Self { colored }
    }

    /// Renders a status line without printing it.
    pub fn format_line(&self, tone: Tone, message: &str) -> String {
        if !self.colored {
            return format!("{} {}", tone.plain_tag(), message);
        }

        match tone {
            Tone::Ok => format!("{} {}", "✓".green().bold(), message),
            Tone::Note => format!("{} {}", "›".cyan(), message.dimmed()),
            Tone::Fail => format!("{} {}", "✗".red().bold(), message.red()),
        }
    }

    /// Prints an [`Tone::Ok`] line.
    pub fn ok(&self, message: &str) {
        println!("{}", self.format_line(Tone::Ok, message));
    }

    /// Prints a [`Tone::Note`] line.
    pub fn note(&self, message: &str) {
        println!("{}", self.format_line(Tone::Note, message));
    }

    /// Failures go to stderr.
    pub fn fail(&self, message: &str) {
        eprintln!("{}", self.format_line(Tone::Fail, message));
    }

    /// Renders a titled block of settings with the keys padded to one column.
    pub fn format_settings(&self, title: &str, rows: &[(&str, String)]) -> String {
        let width = rows.iter().map(|(key, _)| key.len()).max().unwrap_or(0);

        let mut block = if self.colored {
            format!("{}\n", title.bold())
        } else {
            format!("{}\n", title)
        };

        for (key, value) in rows {
            let padded = format!("{:width$}", key, width = width);
            if self.colored {
                block.push_str(&format!("  {}  {}\n", padded.dimmed(), value));
            } else {
                block.push_str(&format!("  {}  {}\n", padded, value));
            }
        }

        block
    }

    /// Prints [`Output::format_settings`].
    pub fn settings(&self, title: &str, rows: &[(&str, String)]) {
        print!("{}", self.format_settings(title, rows));
    }

    /// Startup line, printed once the listener is bound.
    pub fn format_listening(&self, address: &str) -> String {
        let name = format!("postvote {}", env!("CARGO_PKG_VERSION"));
        let url = format!("http://{}", address);

        if self.colored {
            format!("{} listening on {}", name.bold(), url.cyan().underline())
        } else {
            format!("{} listening on {}", name, url)
        }
    }

    /// Prints [`Output::format_listening`].
    pub fn listening(&self, address: &str) {
        println!("{}", self.format_listening(address));
    }
}
