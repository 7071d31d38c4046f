use decklens::query::{describe_group, group_numbers};
use decklens::{QueryDetails, QueryOutcome, SwissEstimate};

const TOP_CARDS: usize = 15;

/// What a piece of report text is, mapped to one ANSI escape each.
#[derive(Clone, Copy)]
enum Style {
    Title,
    Rule,
    Label,
    Value,
    Figure,
    Warning,
    Muted,
}

impl Style {
    fn code(self) -> &'static str {
        match self {
            Style::Title => "\x1b[1;36m",
            Style::Rule => "\x1b[90m",
            Style::Label => "\x1b[34m",
            Style::Value => "\x1b[32m",
            Style::Figure => "\x1b[36m",
            Style::Warning => "\x1b[33m",
            Style::Muted => "\x1b[2m",
        }
    }
}

struct Painter {
    color: bool,
}

impl Painter {
    fn paint(&self, style: Style, text: impl std::fmt::Display) -> String {
        if self.color { format!("{}{text}\x1b[0m", style.code()) } else { text.to_string() }
    }
}

fn section(title: &str, painter: &Painter) {
    println!("\n{}", painter.paint(Style::Rule, format!("━━━ {title} ━━━")));
}

pub fn print_query(details: &QueryDetails, color: bool) {
    let painter = Painter { color };
    println!("\n{}", painter.paint(Style::Title, format!("⚙  Query: \"{}\"", details.text.trim())));

    section("Tokens", &painter);
    if details.tokens.is_empty() {
        println!("{}", painter.paint(Style::Muted, "  No comparisons found"));
    }
    for (idx, token) in details.tokens.iter().enumerate() {
        println!("  {} {}", painter.paint(Style::Rule, format!("[{idx}]")), painter.paint(Style::Value, token));
    }
    for fragment in &details.dropped {
        println!("  {} {}", painter.paint(Style::Warning, "✗"), painter.paint(Style::Muted, format!("dropped \"{fragment}\"")));
    }

    section("Groups", &painter);
    for group in group_numbers(&details.conditions) {
        println!(
            "  {} {}",
            painter.paint(Style::Label, format!("{group}:")),
            describe_group(&details.conditions, group, &painter.paint(Style::Muted, " and "))
        );
    }
    for condition in details.conditions.iter().filter(|c| !c.parameter.is_resolved()) {
        println!("  {} {}", painter.paint(Style::Warning, "?"), painter.paint(Style::Muted, format!("unknown name '{}'", condition.raw_parameter)));
    }

    section("Timing", &painter);
    println!(
        "  Total: {}  │  Tokenize: {}  │  Group: {}",
        painter.paint(Style::Value, format!("{:?}", details.total)),
        painter.paint(Style::Figure, format!("{:?}", details.tokenize)),
        painter.paint(Style::Muted, format!("{:?}", details.group)),
    );
    println!();
}

pub fn print_outcome(input: &str, outcome: &QueryOutcome, color: bool) {
    let painter = Painter { color };
    println!("\n{}", painter.paint(Style::Title, format!("⚙  Query: \"{}\"", input.trim())));

    section("Groups", &painter);
    for group in &outcome.filter.groups {
        println!(
            "  {} {} {} {}",
            painter.paint(Style::Label, format!("{}:", group.group)),
            describe_group(&outcome.conditions, group.group, &painter.paint(Style::Muted, " and ")),
            painter.paint(Style::Muted, "│"),
            painter.paint(Style::Warning, format!("{} decks", group.accepted)),
        );
    }
    for ignored in &outcome.ignored {
        let reasons: Vec<String> = ignored.reasons.iter_names().map(|(name, _)| name.to_lowercase()).collect();
        println!(
            "  {} {} {}",
            painter.paint(Style::Warning, format!("{}: ignored", ignored.group)),
            describe_group(&ignored.conditions, ignored.group, " and "),
            painter.paint(Style::Muted, format!("({})", reasons.join(", "))),
        );
    }

    section("Metagame", &painter);
    let catalog = &outcome.catalog;
    println!(
        "  {} decks  │  {}  │  {} archetypes",
        painter.paint(Style::Value, catalog.count),
        painter.paint(Style::Figure, format!("{:.1}%", catalog.percentage)),
        catalog.unique,
    );
    for share in &catalog.archetypes {
        println!(
            "    {} {} {}",
            painter.paint(Style::Label, format!("#{}", share.archetype_uid)),
            share.count,
            painter.paint(Style::Muted, format!("({:.1}%)", share.percentage)),
        );
    }

    section("Cards", &painter);
    for card in catalog.cards.iter().take(TOP_CARDS) {
        println!(
            "    {:<28} {:>4} {} {}",
            painter.paint(Style::Label, &card.cardname),
            card.count,
            painter.paint(Style::Figure, format!("{:.1}%", card.percentage)),
            painter.paint(Style::Muted, format!("avg {:.2}", card.average)),
        );
    }
    if catalog.cards.len() > TOP_CARDS {
        println!("    {}", painter.paint(Style::Muted, format!("… {} more", catalog.cards.len() - TOP_CARDS)));
    }
    println!();
}

pub fn print_estimate(estimate: &SwissEstimate, color: bool) {
    let painter = Painter { color };
    let verdict = if estimate.exact {
        painter.paint(Style::Value, "exact")
    } else {
        painter.paint(Style::Warning, format!("approximate, deviation {}", estimate.deviation))
    };
    println!(
        "\n{} {}",
        painter.paint(Style::Title, format!("⚙  {} players over {} rounds", estimate.estimated_players, estimate.rounds)),
        painter.paint(Style::Muted, format!("({verdict})")),
    );

    section("Records", &painter);
    println!("  {:>7}  {:>9}  {:>8}", painter.paint(Style::Muted, "record"), painter.paint(Style::Muted, "expected"), painter.paint(Style::Muted, "observed"));
    for (record, expected) in &estimate.theoretical_distribution {
        let observed = estimate.observed_distribution.get(record).map_or_else(|| "-".to_string(), u64::to_string);
        println!(
            "  {:>7}  {:>9}  {:>8}",
            painter.paint(Style::Label, record),
            expected,
            if observed == "-" { painter.paint(Style::Muted, observed) } else { observed },
        );
    }
    println!("\n  Observed: {}", painter.paint(Style::Value, estimate.observed_total));
    println!();
}
