// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! Draws viewable objects into a terminal window.

use crate::activity::SubredditActivity;
use crate::bucket::{BucketEntry, SubredditBucket};
use crate::count::SortAlgorithm;
use crate::modmail::Tallies;
use crate::pipeline::Report;
use crate::text::{plural, separate_thousands};
use colored::{Color, Colorize};
use indoc::formatdoc;

/// View renderer options.
#[derive(Debug, Default)]
pub struct ViewOptions {
    sort: SortAlgorithm,
    show_failures: bool,
}

impl ViewOptions {
    /// Incrementally builds a new set of view options.
    ///
    /// # Examples
    ///
    /// ```
    /// use automodder::count::SortAlgorithm;
    /// use automodder::view::ViewOptions;
    /// let opts = ViewOptions::build()
    ///     .sort(SortAlgorithm::Numerically)
    ///     .show_failures(true)
    ///     .build();
    /// ```
    pub fn build() -> ViewOptionsBuilder {
        ViewOptionsBuilder::default()
    }
}

/// A builder for view options.
///
/// You probably don't want to use this directly; call [`ViewOptions::build()`]
/// and construct it incrementally instead.
#[derive(Debug, Default)]
#[must_use]
pub struct ViewOptionsBuilder {
    sort: SortAlgorithm,
    show_failures: bool,
}

impl ViewOptionsBuilder {
    /// Sets how moderator tallies are sorted.
    pub fn sort(mut self, sort: SortAlgorithm) -> Self {
        self.sort = sort;
        self
    }

    /// Lists every failed action under a report's summary.
    pub fn show_failures(mut self, show_failures: bool) -> Self {
        self.show_failures = show_failures;
        self
    }

    /// Finalizes the [`ViewOptions`].
    pub fn build(self) -> ViewOptions {
        ViewOptions {
            sort: self.sort,
            show_failures: self.show_failures,
        }
    }
}

/// Marks an item that can be converted into a string for display on a terminal.
pub trait Viewable {
    /// Converts the item into a string for display on a terminal.
    fn view(&self, opts: &ViewOptions) -> String;
}

/// Color for a subscriber count, from white for small subreddits to magenta
/// for the largest.
pub fn subscriber_color(subscribers: u64) -> Color {
    match subscribers {
        0..=5_000 => Color::White,
        5_001..=10_000 => Color::Blue,
        10_001..=100_000 => Color::Green,
        100_001..=1_000_000 => Color::Yellow,
        1_000_001..=10_000_000 => Color::Red,
        _ => Color::Magenta,
    }
}

fn position(position: Option<usize>, width: usize) -> String {
    match position {
        Some(p) => {
            let s = format!("{p:<width$}");
            let s = if p <= 10 { s.red() } else { s.green() };
            s.to_string()
        }
        None => format!("{:<width$}", "-").dimmed().to_string(),
    }
}

fn active(active: bool) -> String {
    if active {
        "true".green().to_string()
    } else {
        "false".red().to_string()
    }
}

impl Viewable for Report {
    fn view(&self, opts: &ViewOptions) -> String {
        let mut s = formatdoc! {"
            Scanned:  {}
            Matched:  {}
            Actioned: {}
            Skipped:  {}
            Failed:   {}",
            self.scanned,
            self.matched,
            self.actioned,
            self.skipped,
            self.failed(),
        };
        if opts.show_failures {
            for failure in &self.failures {
                s += &format!("\n    {}: {}", failure.item, failure.reason.red());
            }
        }
        s
    }
}

impl Viewable for BucketEntry {
    fn view(&self, _: &ViewOptions) -> String {
        let subreddit = format!("{:<31}", format!("r/{}", self.subreddit)).yellow();
        let subscribers = format!("{:<12}", separate_thousands(self.subscribers))
            .color(subscriber_color(self.subscribers));
        let mut s = format!(
            "{subreddit} | subscribers: {subscribers} | position: {} | active: {}",
            position(self.position, 4),
            active(self.active),
        );
        for moderator in &self.moderators {
            s += &format!(
                "\n    {} | position: {} | active: {}",
                format!("{:<27}", format!("u/{}", moderator.name)).blue(),
                position(Some(moderator.position), 4),
                active(moderator.is_active()),
            );
        }
        s
    }
}

impl Viewable for SubredditBucket {
    fn view(&self, opts: &ViewOptions) -> String {
        let title = self.kind.title();
        let mut lines = vec![
            title.blue().to_string(),
            "-".repeat(title.len()).green().to_string(),
        ];
        lines.extend(self.entries.iter().map(|entry| entry.view(opts)));
        lines.join("\n")
    }
}

impl Viewable for SubredditActivity {
    fn view(&self, opts: &ViewOptions) -> String {
        let mut s = format!("r/{}", self.name()).yellow().to_string();
        if self.tally.is_empty() {
            s += &format!("\n    {}", "No moderator actions".dimmed());
            return s;
        }
        let counts: Vec<_> = self.tally.sort_by(&opts.sort).collect();
        let width = counts
            .iter()
            .map(|(name, _)| name.len())
            .max()
            .unwrap_or_default();
        for (name, count) in &counts {
            s += &format!("\n    {name:<width$}  {count:>6}");
        }
        s += &format!(
            "\n    {}  {:>6}",
            format!("{:<width$}", "Total").bold(),
            self.tally.total()
        );
        s
    }
}

impl Viewable for Tallies {
    fn view(&self, _: &ViewOptions) -> String {
        self.iter()
            .map(|(subreddit, counts)| {
                let mut s = format!("r/{subreddit}").yellow().to_string();
                let total: usize = counts.values().sum();
                for (state, count) in counts {
                    s += &format!("\n    {:<14} {count:>6}", state.to_string());
                }
                s += &format!("\n    {}", plural(total, "conversation"));
                s
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
