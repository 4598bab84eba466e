use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use rom_inspector::config::Config;
use rom_inspector::flags::HeaderDetails;
use rom_inspector::header::to_hex;
use rom_inspector::hexdump;
use rom_inspector::inspect::{self, LOOKUP_LEN};
use rom_inspector::session::{Command, MenuState, Session, MENU};
use rom_inspector::{
    decode_file, emulator, resolve_variant, scan_file, HeaderRecord, RomError, ScanReport,
};

/// Inspect GB, GBC, GBA, NES and SNES ROM headers
#[derive(Parser)]
#[command(name = "rom-inspector")]
#[command(version)]
struct Args {
    /// Path to the ROM file
    rom_path: PathBuf,

    /// Emulator to start from the menu (overrides the config file)
    #[arg(long)]
    emulator: Option<PathBuf>,

    /// Config file to use instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the report and exit without showing the menu
    #[arg(long)]
    no_menu: bool,

    /// Print the full hex dump and exit
    #[arg(long, conflicts_with = "export")]
    dump: bool,

    /// Write <rom>_dump.hex and exit
    #[arg(long)]
    export: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let rom = args.rom_path.as_path();

    let Some(variant) = resolve_variant(rom) else {
        println!("{} has an unknown extension.", rom.display());
        return Ok(());
    };

    let (_, size) = inspect::open_rom(rom)
        .with_context(|| format!("Failed to open ROM file {}", rom.display()))?;
    println!("ROM size: {} Bytes", size);

    println!("\n=== {} ROM Header Information ===\n", variant);
    match decode_file(rom, variant) {
        Ok(record) => print_header(&record),
        Err(e) => println!("Error reading header: {}", e),
    }

    println!("\n=== ROM search ===");
    match scan_file(rom) {
        Ok(report) => print_scan(&report),
        Err(e) => println!("Error searching ROM: {}", e),
    }

    if args.dump {
        show_dump(rom);
        return Ok(());
    }
    if args.export {
        export_dump(rom);
        return Ok(());
    }
    if args.no_menu {
        return Ok(());
    }

    let config = Config::load(args.config.as_deref()).context("Failed to load config")?;
    let emulator_path = args
        .emulator
        .unwrap_or_else(|| config.emulator_for(variant));
    run_menu(rom, &emulator_path)
}

fn print_header(record: &HeaderRecord) {
    for field in record.fields() {
        println!("{}: {}", field.spec.label, field.value);
    }
    match record.details() {
        Some(HeaderDetails::Nes(nes)) => {
            if !nes.magic_ok {
                println!("Warning: magic number is not NES\\x1A");
            }
            println!("Mapper: {}", nes.mapper);
            println!("Mirroring: {:?}", nes.mirroring);
            println!("Battery: {}", nes.battery);
            println!("Trainer: {}", nes.trainer);
            println!("NES 2.0: {}", nes.nes2);
        }
        Some(HeaderDetails::Snes(snes)) => {
            println!("Speed: {:?}", snes.speed);
            println!("Map mode: {:?}", snes.map_mode);
        }
        None => {}
    }
}

fn print_scan(report: &ScanReport) {
    println!("\nSearch completed: {} blocks processed.", report.blocks);
    println!("\n=== Important information found ===");
    if report.hits.is_empty() {
        println!("No specific patterns found.");
        return;
    }
    for hit in &report.hits {
        println!(
            "Address: 0x{:08X} Data (Hex): {}... ({} at 0x{:08X})",
            hit.offset,
            to_hex(&hit.excerpt),
            hit.marker_str(),
            hit.match_offset
        );
    }
}

fn run_menu(rom: &Path, emulator_path: &Path) -> Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut session = Session::new();
    session.start();

    while !session.is_done() {
        if session.state() == MenuState::AwaitingChoice {
            println!("\nWhat would you like to do?");
            for entry in MENU {
                println!("{}", entry);
            }
        }
        print!("{}", session.prompt());
        io::stdout().flush().context("Failed to flush stdout")?;

        let command = match lines.next() {
            Some(line) => session.handle(&line.context("Failed to read input")?),
            None => session.end_of_input(),
        };

        match command {
            Command::ShowDump => show_dump(rom),
            Command::ExportDump => export_dump(rom),
            Command::PromptAddress | Command::LeaveAddressMode | Command::Ignored => {}
            Command::LaunchEmulator => match emulator::launch(emulator_path, rom) {
                Ok(_) => println!(
                    "Game is started in {}: {}",
                    emulator_path.display(),
                    rom.display()
                ),
                Err(e) => println!("Could not start emulator: {}", e),
            },
            Command::Lookup(address) => lookup(rom, address),
            Command::InvalidAddress(_) => {
                println!("Invalid address. Please enter a valid hex address.")
            }
            Command::InvalidChoice(_) => println!("Invalid selection. Please try again."),
            Command::Quit => println!("Program ended."),
        }
    }
    Ok(())
}

fn show_dump(rom: &Path) {
    println!("=== Complete ROM content ===");
    let result = File::open(rom)
        .map_err(|e| RomError::open(rom, e))
        .and_then(|file| hexdump::write_dump(file, io::stdout().lock()));
    if let Err(e) = result {
        println!("Error displaying ROM contents: {}", e);
    }
}

fn export_dump(rom: &Path) {
    match hexdump::export_dump(rom) {
        Ok(path) => println!("HEX dump created successfully: {}", path.display()),
        Err(e) => println!("Error exporting HEX file: {}", e),
    }
}

fn lookup(rom: &Path, address: i64) {
    match inspect::read_at_path(rom, address, LOOKUP_LEN) {
        Ok(bytes) => println!("{}", hexdump::format_line(address as u64, &bytes)),
        Err(RomError::OutOfRange { .. }) => {
            println!("The entered address is outside the ROM size.")
        }
        Err(e) => println!("Error displaying address: {}", e),
    }
}
