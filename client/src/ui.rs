//! Terminal UI: theme, icon set and the view components the dashboard renders.
//!
//! An [`App`] is built from a [`Ui`] and mounted at [`ROOT_ANCHOR`] on an
//! output sink. After that every [`View`] passed to [`Mounted::render`] is
//! drawn by the component registered for it.

use std::collections::BTreeMap;
use std::io::{self, Write};

use colored::{ColoredString, Colorize};
use common::{PayRangeCount, SalaryRecord};
use thiserror::Error;

/// The one mount point the dashboard page exposes.
pub const ROOT_ANCHOR: &str = "#app";

/// Name the default icon set is registered under.
pub const DEFAULT_ICON_SET: &str = "emoji";

const BAR_WIDTH: usize = 30;

#[derive(Error, Debug)]
pub enum UiError {
    #[error("Mount point {0:?} not found")]
    MountPointNotFound(String),

    #[error("No component registered for {0}")]
    UnregisteredComponent(&'static str),

    #[error("Render failed: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    fn heading(self, text: &str) -> ColoredString {
        match self {
            Theme::Light => text.bold().blue(),
            Theme::Dark => text.bold().bright_cyan(),
        }
    }

    fn accent(self, text: &str) -> ColoredString {
        match self {
            Theme::Light => text.green(),
            Theme::Dark => text.bright_green(),
        }
    }

    fn muted(self, text: &str) -> ColoredString {
        match self {
            Theme::Light => text.dimmed(),
            Theme::Dark => text.bright_black(),
        }
    }
}

/// Glyphs looked up by alias (`"success"`, `"error"`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconSet {
    aliases: BTreeMap<&'static str, &'static str>,
}

impl IconSet {
    pub fn emoji() -> Self {
        let aliases = [
            ("loading", "📡"),
            ("success", "✅"),
            ("error", "❌"),
            ("empty", "⚠️"),
            ("table", "📋"),
            ("summary", "📊"),
            ("search", "🔍"),
        ];
        Self {
            aliases: aliases.into_iter().collect(),
        }
    }

    /// Unknown aliases render as a bullet.
    pub fn glyph(&self, alias: &str) -> &'static str {
        self.aliases.get(alias).copied().unwrap_or("•")
    }
}

/// Every view component the dashboard knows how to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Component {
    SalaryTable,
    PayRangeChart,
    StatusLine,
}

impl Component {
    pub const ALL: [Component; 3] = [
        Component::SalaryTable,
        Component::PayRangeChart,
        Component::StatusLine,
    ];

    fn name(self) -> &'static str {
        match self {
            Component::SalaryTable => "salary table",
            Component::PayRangeChart => "pay range chart",
            Component::StatusLine => "status line",
        }
    }
}

/// Behaviours components apply to the values they draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Directive {
    /// Shorten long cell text with an ellipsis.
    Truncate,
    /// Print numbers with one decimal, `-` when missing.
    FormatNumber,
    /// Scale chart bars to the largest bucket.
    ScaleBar,
}

impl Directive {
    pub const ALL: [Directive; 3] = [
        Directive::Truncate,
        Directive::FormatNumber,
        Directive::ScaleBar,
    ];
}

/// Something to put on screen.
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Salaries(Vec<SalaryRecord>),
    Summary(Vec<PayRangeCount>),
    Status { icon: &'static str, message: String },
}

impl View {
    pub fn status(icon: &'static str, message: impl Into<String>) -> Self {
        View::Status {
            icon,
            message: message.into(),
        }
    }

    fn component(&self) -> Component {
        match self {
            View::Salaries(_) => Component::SalaryTable,
            View::Summary(_) => Component::PayRangeChart,
            View::Status { .. } => Component::StatusLine,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UiConfig {
    pub components: Vec<Component>,
    pub directives: Vec<Directive>,
    pub default_icon_set: &'static str,
    pub icon_sets: BTreeMap<&'static str, IconSet>,
    pub theme: Theme,
}

impl Default for UiConfig {
    /// All components and directives, the emoji icon set and the light theme.
    fn default() -> Self {
        Self {
            components: Component::ALL.to_vec(),
            directives: Directive::ALL.to_vec(),
            default_icon_set: DEFAULT_ICON_SET,
            icon_sets: BTreeMap::from([(DEFAULT_ICON_SET, IconSet::emoji())]),
            theme: Theme::Light,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Ui {
    components: Vec<Component>,
    directives: Vec<Directive>,
    icons: IconSet,
    theme: Theme,
}

impl Ui {
    /// An unknown `default_icon_set` falls back to the emoji set.
    pub fn new(config: UiConfig) -> Self {
        let icons = config
            .icon_sets
            .get(config.default_icon_set)
            .cloned()
            .unwrap_or_else(IconSet::emoji);

        Self {
            components: config.components,
            directives: config.directives,
            icons,
            theme: config.theme,
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn has_directive(&self, directive: Directive) -> bool {
        self.directives.contains(&directive)
    }

    fn cell_text(&self, text: Option<&str>, max: usize) -> String {
        let text = text.unwrap_or("-");
        if self.has_directive(Directive::Truncate) {
            truncate(text, max)
        } else {
            text.to_string()
        }
    }

    fn cell_number(&self, value: Option<f64>) -> String {
        match value {
            Some(v) if !self.has_directive(Directive::FormatNumber) => v.to_string(),
            _ => number(value),
        }
    }

    fn bar_width(&self, count: u64, max: u64) -> usize {
        if self.has_directive(Directive::ScaleBar) {
            ((count as f64 / max as f64) * BAR_WIDTH as f64).round() as usize
        } else {
            count as usize
        }
    }

    fn render(&self, view: &View, out: &mut impl Write) -> Result<(), UiError> {
        let component = view.component();
        if !self.components.contains(&component) {
            return Err(UiError::UnregisteredComponent(component.name()));
        }

        match view {
            View::Salaries(records) => self.render_table(records, out)?,
            View::Summary(buckets) => self.render_chart(buckets, out)?,
            View::Status { icon, message } => {
                writeln!(out, "{} {}", self.icons.glyph(icon), message)?;
            }
        }
        out.flush()?;
        Ok(())
    }

    fn render_table(&self, records: &[SalaryRecord], out: &mut impl Write) -> io::Result<()> {
        if records.is_empty() {
            let empty = self.icons.glyph("empty");
            return writeln!(out, "{empty} No salary records match these filters");
        }

        let header = format!(
            "{:<5} {:<30} {:>6} {:>8} {:<8} {:<20} {}",
            "ID", "TITLE", "EXP", "SIZE", "CURR", "PAY RANGE", "WORK AREA"
        );
        writeln!(out, "{} {}", self.icons.glyph("table"), self.theme.heading(&header))?;

        // One row per record, missing values shown as "-"
        for record in records {
            writeln!(
                out,
                "   {:<5} {:<30} {:>6} {:>8} {:<8} {:<20} {}",
                record.id,
                self.cell_text(record.title.as_deref(), 30),
                self.cell_number(record.experience),
                self.cell_number(record.company_size),
                record.currency.as_deref().unwrap_or("-"),
                record.pay_range.as_deref().unwrap_or("-"),
                record.work_area.as_deref().unwrap_or("-"),
            )?;
        }

        let footer = format!("{} records", records.len());
        writeln!(out, "   {}", self.theme.muted(&footer))
    }

    fn render_chart(&self, buckets: &[PayRangeCount], out: &mut impl Write) -> io::Result<()> {
        if buckets.is_empty() {
            let empty = self.icons.glyph("empty");
            return writeln!(out, "{empty} No pay ranges for these filters");
        }

        writeln!(
            out,
            "{} {}",
            self.icons.glyph("summary"),
            self.theme.heading("Most common pay ranges")
        )?;

        // Every bucket gets at least one block so small counts stay visible
        let max = buckets.iter().map(|b| b.count).max().unwrap_or(0).max(1);
        for bucket in buckets {
            let bar = "█".repeat(self.bar_width(bucket.count, max).max(1));
            writeln!(
                out,
                "   {:<20} {} {}",
                bucket.pay_range.as_deref().unwrap_or("(unspecified)"),
                self.theme.accent(&bar),
                bucket.count
            )?;
        }
        Ok(())
    }
}

fn number(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.1}")).unwrap_or_else(|| "-".to_string())
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max - 1).collect();
        format!("{cut}…")
    }
}

/// Root application object. Holds the UI until it is mounted.
pub struct App {
    ui: Ui,
}

impl App {
    pub fn new(ui: Ui) -> Self {
        Self { ui }
    }

    /// Attaches the application to `anchor` on `out`.
    pub fn mount<W: Write>(self, anchor: &str, out: W) -> Result<Mounted<W>, UiError> {
        if anchor != ROOT_ANCHOR {
            return Err(UiError::MountPointNotFound(anchor.to_string()));
        }
        Ok(Mounted { ui: self.ui, out })
    }
}

/// An application attached to its output.
pub struct Mounted<W: Write> {
    ui: Ui,
    out: W,
}

impl<W: Write> Mounted<W> {
    pub fn render(&mut self, view: &View) -> Result<(), UiError> {
        self.ui.render(view, &mut self.out)
    }

    pub fn ui(&self) -> &Ui {
        &self.ui
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
