#[macro_use]
extern crate log;

use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::{crate_authors, crate_description, crate_version, App, AppSettings, Arg, ArgMatches, SubCommand};
use colored::*;

use spandex_core::config::TypesettingOptions;
use spandex_core::fonts::glyphs::GlyphTable;
use spandex_core::fonts::ligkern::LigKernEntry;
use spandex_core::fonts::manager::FontManager;
use spandex_core::fonts::FontKey;
use spandex_core::layout::paragraphs::engine::LineBreaker;
use spandex_core::layout::paragraphs::hyphenation::DictionaryHyphenator;
use spandex_core::layout::paragraphs::itemize::itemize;
use spandex_core::layout::paragraphs::packing::GlueSign;
use spandex_core::layout::paragraphs::trace::{short_display, MemoryTracer};
use spandex_core::units::Sp;
use spandex_core::Error as SError;

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("{} {}", "error:".bold().red(), e);
        exit(1);
    }
}

#[allow(unknown_lints, dangerous_implicit_autorefs)]
fn run() -> Result<(), Box<dyn Error>> {
    let matches = App::new("spandex-core")
        .version(crate_version!())
        .author(crate_authors!("\n"))
        .about(crate_description!())
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("tfm")
                .about("Prints the content of a font metric file")
                .arg(Arg::with_name("FILE").required(true)),
        )
        .subcommand(
            SubCommand::with_name("break")
                .about("Breaks a paragraph of text into lines")
                .arg(Arg::with_name("TEXT").required(true))
                .arg(
                    Arg::with_name("font")
                        .long("font")
                        .takes_value(true)
                        .required(true)
                        .help("The font metric file"),
                )
                .arg(
                    Arg::with_name("config")
                        .long("config")
                        .takes_value(true)
                        .help("A TOML file of typesetting options"),
                )
                .arg(
                    Arg::with_name("size")
                        .long("size")
                        .takes_value(true)
                        .help("The size of the font, like 12pt"),
                )
                .arg(
                    Arg::with_name("indent")
                        .long("indent")
                        .takes_value(true)
                        .help("The indentation of the first line"),
                )
                .arg(
                    Arg::with_name("trace")
                        .long("trace")
                        .help("Prints the decisions of the line breaker"),
                ),
        )
        .get_matches();

    if let Some(tfm) = matches.subcommand_matches("tfm") {
        print_font(tfm.value_of("FILE").unwrap_or_default())?;
    } else if let Some(paragraph) = matches.subcommand_matches("break") {
        break_text(paragraph)?;
    }

    Ok(())
}

fn print_font(path: &str) -> Result<(), Box<dyn Error>> {
    let table = GlyphTable::from_path(path)?;
    let header = table.header();

    println!("{}", path.bold());
    println!("checksum     {:08X}", header.checksum);
    println!("design size  {}pt", header.design_size);
    if let Some(scheme) = &header.coding_scheme {
        println!("coding       {}", scheme);
    }
    if let Some(family) = &header.family {
        println!("family       {}", family);
    }
    println!("kind         {:?}", table.kind());
    if let Some(boundary) = table.boundary_char() {
        println!("boundary     {}", boundary);
    }

    println!("{}", "parameters".blue().bold());
    for (i, value) in table.params().iter().enumerate() {
        println!("  {:>2}  {}", i + 1, value);
    }

    println!("{}", "characters".blue().bold());
    for (code, glyph) in table.glyphs() {
        println!(
            "  {:>3}  wd {}  ht {}  dp {}  ic {}",
            code, glyph.width, glyph.height, glyph.depth, glyph.italic
        );
        if let Some(next) = glyph.next_larger {
            println!("       next larger {}", next);
        }
        for entry in table.lig_kern_program(code) {
            match entry {
                LigKernEntry::Kern { next_char, kern, .. } => {
                    println!("       {} {} {}", "KRN".cyan(), next_char, kern)
                }
                LigKernEntry::Ligature {
                    next_char,
                    lig_char,
                    op,
                    ..
                } => println!("       {} {} {}", op.to_string().magenta(), next_char, lig_char),
            }
        }
    }

    Ok(())
}

fn break_text(args: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let mut options = match args.value_of("config") {
        Some(path) => TypesettingOptions::from_path(path)?,
        None => TypesettingOptions::default(),
    };

    let font_path = Path::new(args.value_of("font").unwrap_or_default());
    let name = font_path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| SError::FontNotFound(font_path.to_owned()))?;
    let directory = font_path.parent().unwrap_or_else(|| Path::new("."));

    let mut key = FontKey::new(name);
    if let Some(size) = args.value_of("size") {
        key = key.at(size.parse::<Sp>()?);
    }
    let indent = match args.value_of("indent") {
        Some(indent) => indent.parse::<Sp>()?,
        None => Sp(0),
    };

    let mut manager = FontManager::new(&[directory]);
    let font = manager.load(key)?;
    debug!("loaded {} at {}", name, font.actual_size());

    let paragraph = itemize(args.value_of("TEXT").unwrap_or_default(), &font, 0, indent);
    let mut hyphenator = DictionaryHyphenator::english()?;
    let mut tracer = MemoryTracer::new();

    let broken = if args.is_present("trace") {
        LineBreaker::new(&mut options)
            .hyphenator(&mut hyphenator)
            .tracer(&mut tracer)
            .break_paragraph(paragraph)?
    } else {
        LineBreaker::new(&mut options)
            .hyphenator(&mut hyphenator)
            .break_paragraph(paragraph)?
    };

    for line in &tracer.lines {
        println!("{}", line.dimmed());
    }

    for line in broken.lines() {
        let ratio = match line.glue_set.sign {
            GlueSign::Normal => String::from(" 0.000"),
            GlueSign::Stretching => format!("+{:.3}", line.glue_set.ratio),
            GlueSign::Shrinking => format!("-{:.3}", line.glue_set.ratio),
        };
        let badness = if line.is_overfull() {
            "overfull".red().to_string()
        } else {
            line.badness.to_string()
        };
        println!("{} {:>8} | {}", ratio, badness, short_display(&line.list));
    }

    println!(
        "{} lines, {} demerits, {} pass",
        broken.breaks.len(),
        broken.total_demerits,
        broken.pass
    );

    Ok(())
}
