use nu_ansi_term::{Color, Style};
use std::fmt::Display;
use std::io::IsTerminal;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Theme {
    Auto,
    Light,
    Dark,
    Plain,
}

pub struct Ui {
    palette: Palette,
    paint: bool,
}

impl Ui {
    pub fn new(theme: Theme) -> Self {
        let paint = theme != Theme::Plain && std::io::stdout().is_terminal();

        #[cfg(windows)]
        if paint {
            let _ = nu_ansi_term::enable_ansi_support();
        }

        let palette = match theme {
            Theme::Plain => Palette::plain(),
            Theme::Light => Palette::light(),
            Theme::Dark | Theme::Auto => Palette::dark(),
        };

        Self { palette, paint }
    }

    pub fn spacer(&self) {
        println!();
    }

    pub fn section<'a, I, V>(&self, title: &str, rows: I)
    where
        I: IntoIterator<Item = (&'a str, V)>,
        V: Display,
    {
        let rows: Vec<(String, String)> = rows
            .into_iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();

        if rows.is_empty() {
            return;
        }

        self.heading(title);
        let key_width = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
        for (key, value) in rows {
            if self.paint {
                println!(
                    "  {} {}",
                    self.palette.key.paint(format!("{key:>key_width$}:")),
                    self.palette.value.paint(value)
                );
            } else {
                println!("  {key:>key_width$}: {value}");
            }
        }
    }

    /// Prints annotation sentences as a numbered list, turning their
    /// `<b>`/`<em>` markup into terminal emphasis.
    pub fn numbered<'a, I>(&self, title: &str, entries: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let entries: Vec<&str> = entries.into_iter().collect();
        if entries.is_empty() {
            return;
        }
        self.heading(title);
        let width = entries.len().to_string().len();
        for (position, entry) in entries.iter().enumerate() {
            let number = format!("{:>width$}.", position + 1);
            if self.paint {
                println!(
                    "  {} {}",
                    self.palette.bullet.paint(number),
                    self.markup(entry)
                );
            } else {
                println!("  {number} {}", self.markup(entry));
            }
        }
    }

    pub fn list<I>(&self, title: &str, entries: I)
    where
        I: IntoIterator<Item = String>,
    {
        let entries: Vec<String> = entries.into_iter().collect();
        if entries.is_empty() {
            return;
        }
        self.heading(title);
        for entry in entries {
            if self.paint {
                println!("  {} {entry}", self.palette.bullet.paint("•"));
            } else {
                println!("  - {entry}");
            }
        }
    }

    pub fn info(&self, message: &str) {
        let prefix = if self.paint {
            self.palette.info.paint(INFO_ICON)
        } else {
            Style::new().paint(INFO_ICON)
        };
        println!("{prefix} {message}");
    }

    fn heading(&self, title: &str) {
        let formatted = format!("{HEADING_ICON} {title}");
        if self.paint {
            println!("{}", self.palette.heading.paint(formatted));
        } else {
            println!("{formatted}");
        }
    }

    fn markup(&self, text: &str) -> String {
        markup_spans(text)
            .into_iter()
            .map(|span| {
                if !self.paint {
                    return span.text.to_string();
                }
                let mut style = self.palette.value;
                if span.bold {
                    style = style.bold();
                }
                if span.italic {
                    style = style.italic();
                }
                style.paint(span.text).to_string()
            })
            .collect()
    }
}

#[derive(Debug, PartialEq, Eq)]
struct Span<'a> {
    text: &'a str,
    bold: bool,
    italic: bool,
}

const TAGS: [(&str, Option<bool>, Option<bool>); 4] = [
    ("<b>", Some(true), None),
    ("</b>", Some(false), None),
    ("<em>", None, Some(true)),
    ("</em>", None, Some(false)),
];

/// Splits annotation markup into styled runs, dropping the tags.
fn markup_spans(text: &str) -> Vec<Span<'_>> {
    let mut spans = Vec::new();
    let (mut bold, mut italic) = (false, false);
    let mut rest = text;
    let mut start = 0;
    let mut offset = 0;
    while let Some(found) = rest.find('<') {
        let at = offset + found;
        let tag = TAGS
            .iter()
            .find(|(name, _, _)| text[at..].starts_with(*name));
        let Some((name, set_bold, set_italic)) = tag else {
            offset = at + 1;
            rest = &text[offset..];
            continue;
        };
        if at > start {
            spans.push(Span {
                text: &text[start..at],
                bold,
                italic,
            });
        }
        bold = set_bold.unwrap_or(bold);
        italic = set_italic.unwrap_or(italic);
        offset = at + name.len();
        start = offset;
        rest = &text[offset..];
    }
    if start < text.len() {
        spans.push(Span {
            text: &text[start..],
            bold,
            italic,
        });
    }
    spans
}

struct Palette {
    heading: Style,
    key: Style,
    value: Style,
    bullet: Style,
    info: Style,
}

impl Palette {
    fn dark() -> Self {
        Self {
            heading: Style::new().fg(Color::Purple).bold(),
            key: Style::new().fg(Color::LightBlue).bold(),
            value: Style::new().fg(Color::White),
            bullet: Style::new().fg(Color::LightBlue),
            info: Style::new().fg(Color::LightCyan),
        }
    }

    fn light() -> Self {
        Self {
            heading: Style::new().fg(Color::Blue).bold(),
            key: Style::new().fg(Color::Black).bold(),
            value: Style::new().fg(Color::Black),
            bullet: Style::new().fg(Color::Blue),
            info: Style::new().fg(Color::Purple),
        }
    }

    fn plain() -> Self {
        Self {
            heading: Style::new(),
            key: Style::new(),
            value: Style::new(),
            bullet: Style::new(),
            info: Style::new(),
        }
    }
}

const HEADING_ICON: &str = "▸";
const INFO_ICON: &str = "ℹ";
