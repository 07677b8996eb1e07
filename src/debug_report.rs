use minimerge::{Parse, ParseResultVerbose, StepSummary};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }
    }
}

const SAMPLES: usize = 5;

pub fn print_run(res: &ParseResultVerbose, color: bool) {
    let palette = ansi::Palette::new(color);
    let details = &res.details;
    println!("\n{}", palette.bold(palette.paint(format!("⚙  Parsing: \"{}\"", res.sentence), ansi::CYAN)));
    println!(
        "  {} {}  {} {}",
        palette.dim("word parts:"),
        palette.paint(details.word_parts.join(" "), ansi::BLUE),
        palette.dim("│ policy:"),
        palette.paint(details.policy, ansi::CYAN)
    );

    println!("\n{}", palette.paint("━━━ Steps ━━━", ansi::GRAY));
    for step in &details.steps {
        print_step(step, &palette);
    }

    if !details.categories.is_empty() {
        println!("\n{}", palette.paint("━━━ Categories ━━━", ansi::GRAY));
        for (name, signals) in &details.categories {
            let signals: Vec<String> = signals.iter().map(|s| s.to_string()).collect();
            println!("  {} {}", palette.paint(name, ansi::BLUE), palette.dim(signals.join(" ")));
        }
    }

    println!("\n{}", palette.paint("━━━ Results ━━━", ansi::GRAY));
    if res.parses.is_empty() {
        println!("{}", palette.dim("  No complete parse"));
        println!("\n{}", palette.paint("Possible reasons:", ansi::YELLOW));
        println!("  • No selecting feature matched a word's category");
        println!("  • A mover could not reach its head under the neighbor policy");
        println!("  • Routes were dropped by a cap (see below)");
        println!("\n{}", palette.dim("  Tip: Set MINIMERGE_LOG=minimerge=trace to see every combination attempt"));
    } else {
        print_results(&res.parses, &palette);
    }

    if details.capped > 0 {
        println!(
            "\n  {} {}",
            palette.paint("⚠", ansi::YELLOW),
            palette.paint(format!("{} routes dropped by caps; results may be incomplete", details.capped), ansi::YELLOW)
        );
    }

    println!("\n{}", palette.paint("━━━ Timing ━━━", ansi::GRAY));
    println!(
        "  Total: {}  │  Routes: {}  │  Complete: {}",
        palette.paint(format!("{:?}", details.total), ansi::GREEN),
        palette.paint(details.routes.to_string(), ansi::CYAN),
        palette.dim(details.complete.to_string()),
    );
    println!();
}

fn print_step(step: &StepSummary, palette: &ansi::Palette) {
    let label = format!("{}-{}:", step.word, step.signal);
    println!(
        "  {} {}  {}",
        palette.paint(label, ansi::BLUE),
        if step.routes_added > 0 {
            palette.paint(format!("✓ {} routes", step.routes_added), ansi::GREEN)
        } else {
            palette.dim(format!("✗ {} routes", step.routes_added))
        },
        palette.dim(format!("{:?}, {} passes", step.duration, step.passes))
    );

    for (head, arg) in &step.merges {
        println!("    {} {}", palette.dim("merge"), palette.paint(format!("{head} ← {arg}"), ansi::YELLOW));
    }
    for (host, adjunct) in &step.adjunctions {
        println!("    {} {}", palette.dim("adjoin"), palette.paint(format!("{host} + {adjunct}"), ansi::YELLOW));
    }
    for sample in step.samples.iter().take(SAMPLES) {
        println!("    {}", palette.dim(sample));
    }
    if step.routes_added > SAMPLES {
        println!("    {}", palette.dim(format!("... +{} more", step.routes_added - SAMPLES)));
    }
}

fn print_results(parses: &[Parse], palette: &ansi::Palette) {
    for (idx, parse) in parses.iter().enumerate() {
        println!(
            "  {} {} {} {}",
            palette.paint(format!("[{}]", idx), ansi::GRAY),
            palette.bold(palette.paint(&parse.tree, ansi::GREEN)),
            palette.dim("│"),
            palette.paint(format!("cost {:.1}", parse.cost), ansi::YELLOW),
        );
        println!(
            "      {} {}  {} {}",
            palette.dim("route:"),
            palette.paint(&parse.route, ansi::BLUE),
            palette.dim("│ size/weight:"),
            palette.paint(format!("{}/{}", parse.size, parse.weight), ansi::CYAN)
        );
    }
}
