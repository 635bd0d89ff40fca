//! Headless terminal runner
//!
//! Feeds a byte stream (stdin or a file) through a terminal over an
//! in-memory surface and writes the rasterized screen as a binary PPM.
//! Useful for golden-image testing and for eyeballing escape sequences
//! without wiring up a display.
//!
//! ```bash
//! printf 'hi \x1b[1;31mthere\x1b[m\n' | \
//!     rasterm-headless --font DejaVuSansMono.ttf --output screen.ppm
//! ```

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use rasterm::{BufferSurface, Surface, Term, TileSets};

struct Args {
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    font: Option<PathBuf>,
    bold_font: Option<PathBuf>,
    cols: usize,
    rows: usize,
    help: bool,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            input: None,
            output: None,
            font: None,
            bold_font: None,
            cols: 80,
            rows: 24,
            help: false,
        }
    }
}

fn parse_args() -> Args {
    let mut args = Args::default();
    let argv: Vec<String> = std::env::args().skip(1).collect();

    let mut i = 0;
    while i < argv.len() {
        match argv[i].as_str() {
            "-h" | "--help" => {
                args.help = true;
            }
            "-i" | "--input" => {
                i += 1;
                if i < argv.len() {
                    args.input = Some(PathBuf::from(&argv[i]));
                }
            }
            "-o" | "--output" => {
                i += 1;
                if i < argv.len() {
                    args.output = Some(PathBuf::from(&argv[i]));
                }
            }
            "-f" | "--font" => {
                i += 1;
                if i < argv.len() {
                    args.font = Some(PathBuf::from(&argv[i]));
                }
            }
            "-b" | "--bold-font" => {
                i += 1;
                if i < argv.len() {
                    args.bold_font = Some(PathBuf::from(&argv[i]));
                }
            }
            "-c" | "--cols" => {
                i += 1;
                if i < argv.len() {
                    args.cols = argv[i].parse().unwrap_or(80);
                }
            }
            "-r" | "--rows" => {
                i += 1;
                if i < argv.len() {
                    args.rows = argv[i].parse().unwrap_or(24);
                }
            }
            _ => {}
        }
        i += 1;
    }

    args
}

fn print_help() {
    eprintln!(
        r#"rasterm-headless - render a byte stream to a PPM image

USAGE:
    rasterm-headless --font <TTF> [OPTIONS]

OPTIONS:
    -h, --help              Show this help message
    -f, --font <TTF>        Monospace font file (required)
    -b, --bold-font <TTF>   Bold face (defaults to the regular font)
    -i, --input <FILE>      Input bytes (stdin if not specified)
    -o, --output <FILE>     Output PPM (stdout if not specified)
    -c, --cols <N>          Terminal columns (default: 80)
    -r, --rows <N>          Terminal rows (default: 24)

EXAMPLES:
    printf 'plain \x1b[7mreverse\x1b[m\n' | \
        rasterm-headless -f DejaVuSansMono.ttf -o screen.ppm
"#
    );
}

const CELL_W: i32 = 8;
const CELL_H: i32 = 16;

fn run(args: Args) -> io::Result<()> {
    let Some(font_path) = &args.font else {
        print_help();
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "--font is required"));
    };

    let regular = std::fs::read(font_path)?;
    let bold = match &args.bold_font {
        Some(path) => std::fs::read(path)?,
        None => regular.clone(),
    };
    let tiles = TileSets::from_fonts(&regular, &bold, CELL_W, CELL_H)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;

    let input = if let Some(path) = &args.input {
        std::fs::read(path)?
    } else {
        let mut data = Vec::new();
        io::stdin().read_to_end(&mut data)?;
        data
    };

    let surface = BufferSurface::new(args.cols as i32 * CELL_W, args.rows as i32 * CELL_H);
    let mut term = Term::new(args.cols.max(1), args.rows.max(1), Box::new(surface), tiles);
    term.process(&input);

    let ppm = term.with_surface_ref(encode_ppm);

    if let Some(path) = &args.output {
        File::create(path)?.write_all(&ppm)?;
    } else {
        io::stdout().write_all(&ppm)?;
    }

    Ok(())
}

/// Binary PPM (P6) encoding of the whole surface.
fn encode_ppm(surface: &dyn Surface) -> Vec<u8> {
    let b = surface.bounds();
    let mut out = format!("P6\n{} {}\n255\n", b.dx(), b.dy()).into_bytes();
    for y in b.min.y..b.max.y {
        for x in b.min.x..b.max.x {
            let c = surface.get(x, y);
            out.extend_from_slice(&[c.r, c.g, c.b]);
        }
    }
    out
}

fn main() -> io::Result<()> {
    let args = parse_args();

    if args.help {
        print_help();
        return Ok(());
    }

    run(args)
}
