use std::fmt::Write as _;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use markdown_section::{group_document, parse_document, render_html, SectionWrapper};
use markdown_section_config::{Config, LoadOptions};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Benchmark harness for markdown-section parsing, grouping and rendering"
)]
struct Args {
    /// Markdown file to benchmark against; a synthetic document is generated when omitted
    #[arg(long, value_name = "PATH")]
    path: Option<PathBuf>,

    /// Top-level sections in the synthetic document
    #[arg(long, default_value_t = 200)]
    sections: usize,

    /// Heading depth of the synthetic document (1-6)
    #[arg(long, default_value_t = 4)]
    depth: usize,

    /// Number of warm-up iterations (not counted in results)
    #[arg(long, default_value_t = 1)]
    warmup: usize,

    /// Number of measured iterations
    #[arg(long, default_value_t = 5)]
    iterations: usize,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load(LoadOptions::default())?;
    let wrapper = SectionWrapper::new(config.classes.clone()).with_markdown_options(config.markdown);

    let source = match &args.path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read benchmark input '{}'", path.display()))?,
        None => synthetic_document(args.sections, args.depth.clamp(1, 6)),
    };

    let parse_result = benchmark("parse", args.warmup, args.iterations, || {
        parse_document(&source, &config.markdown);
        Ok(())
    })?;

    let group_result = benchmark("parse+group", args.warmup, args.iterations, || {
        let mut document = parse_document(&source, &config.markdown);
        group_document(&mut document);
        Ok(())
    })?;

    let grouped = wrapper.parse(&source);
    let render_result = benchmark("render", args.warmup, args.iterations, || {
        render_html(&grouped, &config.classes, std::io::sink())?;
        Ok(())
    })?;

    let end_to_end = benchmark("end-to-end", args.warmup, args.iterations, || {
        wrapper.render(&source)?;
        Ok(())
    })?;

    print_summary(
        source.len(),
        &[parse_result, group_result, render_result, end_to_end],
    );
    Ok(())
}

fn synthetic_document(sections: usize, depth: usize) -> String {
    let mut source = String::from("Preamble paragraph before any heading.\n\n");
    for section in 0..sections {
        for level in 1..=depth {
            let _ = writeln!(source, "{} Section {section} level {level}\n", "#".repeat(level));
            let _ = writeln!(source, "Body text for section {section} at level {level}.\n");
            if level == depth {
                source.push_str("- item one\n- item two\n\n> quoted\n\n");
            }
        }
    }
    source
}

struct BenchResult {
    name: String,
    iterations: usize,
    average: Duration,
    median: Duration,
}

fn benchmark<F>(name: &str, warmup: usize, iterations: usize, mut f: F) -> Result<BenchResult>
where
    F: FnMut() -> Result<()>,
{
    for _ in 0..warmup {
        f()?;
    }

    let iterations = iterations.max(1);
    let mut samples = Vec::with_capacity(iterations);
    for _ in 0..iterations {
        let start = Instant::now();
        f()?;
        samples.push(start.elapsed());
    }

    samples.sort();
    let total = samples
        .iter()
        .copied()
        .fold(Duration::ZERO, |acc, sample| acc + sample);
    let average = total / (iterations as u32);
    let median = samples[samples.len() / 2];

    Ok(BenchResult {
        name: name.to_string(),
        iterations,
        average,
        median,
    })
}

fn print_summary(input_bytes: usize, results: &[BenchResult]) {
    println!("markdown-section benchmark results ({input_bytes} bytes of input):\n");
    for result in results {
        println!(
            "- {}: avg {:?} (median {:?}) over {} iterations",
            result.name, result.average, result.median, result.iterations
        );
    }
}
