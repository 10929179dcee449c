//! ALU8 LCD - CLI Entry Point
//!
//! Commands:
//! - `alu8-lcd eval <a> <b> <op>` - Evaluate one operation
//! - `alu8-lcd table <op>` - Summarize an operation over all operands
//! - `alu8-lcd run` - Drive the board and print the display traffic
//! - `alu8-lcd monitor` - Interactive live monitor
//! - `alu8-lcd test` - Built-in self-test

use clap::{Parser, Subcommand};
use alu8::{Opcode, SimConfig};

#[derive(Parser)]
#[command(name = "alu8-lcd")]
#[command(author = "Yigit")]
#[command(version = "0.1.0")]
#[command(about = "A signed 8-bit ALU driving a character LCD")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate one operation and show how it is displayed
    Eval {
        /// Operand A (-128..127)
        #[arg(allow_negative_numbers = true)]
        a: i8,
        /// Operand B (-128..127)
        #[arg(allow_negative_numbers = true)]
        b: i8,
        /// Operation (ADD, SUB, MUL, DIV, AND, OR, XOR, NAND or 0-7)
        op: Opcode,
    },
    /// Summarize an operation over every operand pair
    Table {
        /// Operation (ADD, SUB, MUL, DIV, AND, OR, XOR, NAND or 0-7)
        op: Opcode,
        /// Print every result for this fixed A instead of a summary
        #[arg(short, long, allow_negative_numbers = true)]
        a: Option<i8>,
    },
    /// Drive the board and print the transactions sent to the display
    Run {
        #[command(flatten)]
        sim: SimArgs,
        /// Print transactions as JSON
        #[arg(long)]
        json: bool,
    },
    /// Interactive live monitor
    Monitor {
        #[command(flatten)]
        sim: SimArgs,
    },
    /// Run the built-in self-test
    Test,
}

/// Simulation settings shared by `run` and `monitor`.
#[derive(clap::Args)]
struct SimArgs {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<String>,
    /// Operand A
    #[arg(long, allow_negative_numbers = true)]
    a: Option<i8>,
    /// Operand B
    #[arg(long, allow_negative_numbers = true)]
    b: Option<i8>,
    /// Active-low selector (0-7); overrides --op
    #[arg(long)]
    selector: Option<u8>,
    /// Operation, converted to the matching selector
    #[arg(long)]
    op: Option<Opcode>,
    /// Ticks per sequencer step
    #[arg(long)]
    period: Option<u32>,
    /// Ticks enable stays high per step
    #[arg(long)]
    pulse_width: Option<u32>,
    /// Number of sequencer steps to run (at most 1000000)
    #[arg(short, long)]
    steps: Option<u64>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Eval { a, b, op }) => {
            eval(a, b, op);
        }
        Some(Commands::Table { op, a }) => {
            table(op, a);
        }
        Some(Commands::Run { sim, json }) => {
            run(&resolve_config(&sim), json);
        }
        Some(Commands::Monitor { sim }) => {
            monitor(resolve_config(&sim));
        }
        Some(Commands::Test) => {
            run_self_test();
        }
        None => {
            println!("ALU8 LCD v0.1.0");
            println!("A signed 8-bit ALU driving a character LCD");
            println!();
            println!("Use --help for available commands");
            println!();
            demo();
        }
    }
}

fn init_logging(verbose: u8) {
    use tracing_subscriber::EnvFilter;
    
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Merge a config file (if any) with command-line overrides.
fn resolve_config(sim: &SimArgs) -> SimConfig {
    use alu8::load_config;
    
    let mut config = match &sim.config {
        Some(path) => match load_config(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("❌ Failed to load config: {}", e);
                std::process::exit(1);
            }
        },
        None => SimConfig::default(),
    };
    
    if let Some(a) = sim.a {
        config.inputs.a = a;
    }
    if let Some(b) = sim.b {
        config.inputs.b = b;
    }
    if let Some(op) = sim.op {
        config.inputs.selector = op.selector();
    }
    if let Some(selector) = sim.selector {
        config.inputs.selector = selector;
    }
    if let Some(steps) = sim.steps {
        config.steps = steps;
    }
    
    if let Err(e) = config
        .override_timing(sim.period, sim.pulse_width)
        .and_then(|()| config.validate())
    {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
    
    config
}

fn eval(a: i8, b: i8, op: Opcode) {
    use alu8::{evaluate, Frame};
    use alu8::alu::display_byte;
    
    let result = evaluate(a, b, op);
    let low = display_byte(result);
    
    println!("{} {} {} = {}", a, op, b, result);
    println!("  16-bit:   0x{:04X}", result as u16);
    println!("  low byte: {} (0x{:02X})", low, low);
    println!("  display:  {}", Frame::compute(a, b, op));
}

fn table(op: Opcode, fixed_a: Option<i8>) {
    use alu8::evaluate;
    use alu8::alu::display_byte;
    
    if let Some(a) = fixed_a {
        for b in i8::MIN..=i8::MAX {
            let result = evaluate(a, b, op);
            println!("{:>4} {} {:>4} = {:>6}  [{:03}]", a, op, b, result, display_byte(result));
        }
        return;
    }
    
    let results: Vec<i16> = (i8::MIN..=i8::MAX)
        .flat_map(|a| (i8::MIN..=i8::MAX).map(move |b| evaluate(a, b, op)))
        .collect();
    let min = results.iter().min().copied().unwrap_or(0);
    let max = results.iter().max().copied().unwrap_or(0);
    let zeros = results.iter().filter(|&&r| r == 0).count();
    
    println!("━━━ {} over 256 × 256 operands ━━━", op);
    println!("Minimum: {}", min);
    println!("Maximum: {}", max);
    println!("Zero results: {}", zeros);
    if op.is_bitwise() {
        println!("Upper byte: always zero (zero-extended)");
    } else {
        println!("Upper byte: sign-carrying");
    }
}

fn run(config: &SimConfig, json: bool) {
    use alu8::{Board, Lcd};
    
    let mut board = Board::with_timing(config.timing);
    let mut lcd = Lcd::new();
    let transactions = board.run_steps(config.steps, &config.inputs, &mut lcd);
    
    if json {
        match serde_json::to_string_pretty(&transactions) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                eprintln!("❌ Failed to encode transactions: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }
    
    println!("🔧 A={} B={} selector={:03b} ({})",
        config.inputs.a, config.inputs.b, config.inputs.selector & 0b111, config.inputs.opcode());
    println!("   {} ticks/step, enable high for {} ticks",
        config.timing.period(), config.timing.pulse_width());
    println!();
    println!("━━━ Transactions ━━━");
    for (i, t) in transactions.iter().enumerate() {
        println!("{:>4}: {}", i, t);
    }
    
    println!();
    println!("━━━ Display ━━━");
    println!("┌────────────────┐");
    for row in 0..alu8::display::lcd::LINES {
        println!("│{}│", lcd.line(row));
    }
    println!("└────────────────┘");
    println!("Ticks: {}", board.seq.ticks);
}

#[cfg(feature = "tui")]
fn monitor(config: SimConfig) {
    use alu8::{run_monitor, Timing};
    
    // The reference clock is far too slow to watch; pace the monitor faster
    // unless timing was set explicitly.
    let config = if config.timing == Timing::REFERENCE {
        SimConfig { timing: Timing::new(1024, 64).unwrap_or(Timing::REFERENCE), ..config }
    } else {
        config
    };
    
    if let Err(e) = run_monitor(config) {
        eprintln!("❌ Monitor error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "tui"))]
fn monitor(_config: SimConfig) {
    eprintln!("❌ Built without the `tui` feature");
    std::process::exit(1);
}

fn demo() {
    use alu8::{evaluate, Frame};
    
    println!("━━━ ALU Demo ━━━");
    println!();
    for (a, b) in [(5i8, 3i8), (-128, -1), (100, 27)] {
        for op in Opcode::ALL {
            println!("  {:>4} {:<4} {:>4} = {:>6}   {}", a, op, b, evaluate(a, b, op), Frame::compute(a, b, op));
        }
        println!();
    }
}

fn run_self_test() {
    use alu8::{evaluate, digits, mnemonic, Board, Inputs, Lcd, Step, Timing};
    
    println!("━━━ ALU8 Self-Test ━━━");
    println!();
    
    let mut passed = 0;
    let mut failed = 0;
    let pairs = || (i8::MIN..=i8::MAX).flat_map(|a| (i8::MIN..=i8::MAX).map(move |b| (a, b)));
    
    let mut check = |name: &str, ok: bool| {
        if ok {
            println!("{}... ✓", name);
            passed += 1;
        } else {
            println!("{}... ✗", name);
            failed += 1;
        }
    };
    
    check("MUL equals signed product",
        pairs().all(|(a, b)| evaluate(a, b, Opcode::Mul) as i32 == a as i32 * b as i32));
    check("DIV truncates toward zero",
        pairs().filter(|&(_, b)| b != 0).all(|(a, b)| evaluate(a, b, Opcode::Div) as i32 == a as i32 / b as i32));
    check("DIV by zero is zero",
        (i8::MIN..=i8::MAX).all(|a| evaluate(a, 0, Opcode::Div) == 0));
    check("ADD sign-extends wrapped sum",
        pairs().all(|(a, b)| evaluate(a, b, Opcode::Add) == a.wrapping_add(b) as i16));
    check("Digits",
        digits(8) == *b"008" && digits(255) == *b"255" && digits(0) == *b"000");
    check("Mnemonics",
        mnemonic(Opcode::Add) == *b"ADD" && mnemonic(Opcode::Or) == *b"OR " && mnemonic(Opcode::Nand) == *b"NAN");
    
    let mut step = Step::Init8BitMode;
    for _ in 0..4 {
        step = step.next();
    }
    let after_init = step;
    for _ in 0..9 {
        step = step.next();
    }
    check("Sequencer refresh loop", after_init == Step::MnemonicChar0 && step == Step::MnemonicChar0);
    
    let line = |inputs: Inputs| {
        let timing = Timing::new(64, 8).unwrap_or(Timing::REFERENCE);
        let mut board = Board::with_timing(timing);
        let mut lcd = Lcd::new();
        board.run_steps(13, &inputs, &mut lcd);
        lcd.text()
    };
    check("End-to-end ADD 5 3", line(Inputs { a: 5, b: 3, selector: 0b111 }) == "ADD: 008");
    check("End-to-end DIV -128 -1", line(Inputs::new(-128, -1, Opcode::Div)) == "DIV: 128");
    
    println!();
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Results: {} passed, {} failed", passed, failed);
    
    if failed == 0 {
        println!("✓ All tests passed!");
    } else {
        std::process::exit(1);
    }
}
