use clap::{Parser, Subcommand};
use colored_json::{Color, ColorMode, Output, Styler, ToColoredJson};
use iab_tcf::segments::SegmentType;
use iab_tcf::v2::{TcfEuV2, VendorConsents};
use tracing::debug;

mod logging;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Show debug events of the decoder on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a TCF string and display it in the console
    Parse {
        /// TCF string to parse
        tcf_string: String,
    },
    /// Answer consent questions about vendors and purposes
    Query {
        /// TCF string to parse
        tcf_string: String,
        /// Vendor ID to check, may be repeated
        #[arg(short, long)]
        vendor: Vec<u16>,
        /// Purpose ID to check, may be repeated
        #[arg(short, long)]
        purpose: Vec<u8>,
    },
    /// List all segments
    Segments {
        /// TCF string to parse
        tcf_string: String,
    },
}

fn main() {
    let args = Cli::parse();
    logging::setup_logging(args.verbose);

    let e = match args.cmd {
        Commands::Parse { tcf_string } => parse_tcf_string(&tcf_string),
        Commands::Query {
            tcf_string,
            vendor,
            purpose,
        } => query(&tcf_string, &vendor, &purpose),
        Commands::Segments { tcf_string } => list_segments(&tcf_string),
    };

    if let Err(e) = e {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn parse_tcf_string(s: &str) -> Result<(), Box<dyn std::error::Error>> {
    let tcf = TcfEuV2::parse_str(s)?;

    println!(
        "{}",
        serde_json::to_string_pretty(&tcf)?
            .to_colored_json_with_styler(ColorMode::Auto(Output::StdOut), json_color_styler())?
    );

    Ok(())
}

fn query(s: &str, vendors: &[u16], purposes: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
    let tcf = TcfEuV2::parse_str(s)?;
    debug!(
        vendors = vendors.len(),
        purposes = purposes.len(),
        "answering queries"
    );

    for &id in purposes {
        println!(
            "purpose {id}\tconsent: {}\tlegitimate interest: {}",
            tcf.purpose_allowed(id),
            tcf.purpose_legitimate_interest(id)
        );
    }

    for &id in vendors {
        let disclosed = match tcf.has_disclosed_vendors() {
            true => tcf.vendor_disclosed(id).to_string(),
            false => "unknown".to_string(),
        };
        let restricted_purposes = tcf
            .publisher_restrictions_for(id)
            .map(|r| format!("{}:{:?}", r.purpose_id, r.restriction_type))
            .collect::<Vec<_>>();

        println!(
            "vendor {id}\tconsent: {}\tlegitimate interest: {}\tdisclosed: {disclosed}\trestrictions: [{}]",
            tcf.vendor_consent(id),
            tcf.vendor_legitimate_interest(id),
            restricted_purposes.join(", ")
        );
    }

    Ok(())
}

fn list_segments(s: &str) -> Result<(), Box<dyn std::error::Error>> {
    let tcf = TcfEuV2::parse_str(s)?;

    println!("0\t{}", SegmentType::Core);
    for (i, t) in tcf.segment_types.iter().enumerate() {
        println!("{}\t{}", i + 1, t);
    }

    Ok(())
}

fn json_color_styler() -> Styler {
    Styler {
        key: Color::Green.foreground(),
        string_value: Color::Blue.bold(),
        integer_value: Color::Magenta.bold(),
        float_value: Color::Magenta.italic(),
        object_brackets: Color::Yellow.bold(),
        array_brackets: Color::Cyan.bold(),
        ..Default::default()
    }
}
