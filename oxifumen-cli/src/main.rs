//! OxiFumen CLI
//!
//! Decode fumen strings into readable page listings or JSON, and encode a
//! JSON page document back into a fumen string.

use clap::{Parser, Subcommand};
use oxifumen::{Field, Flags, Mino, Operation, Page, Refs, Rotation};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "oxifumen")]
#[command(author, version, about = "Fumen board-sequence codec")]
#[command(long_about = "
Converts between fumen strings and page sequences.

Examples:
  oxifumen decode v115@vhAAgH
  oxifumen decode --json v115@vhBAgHAgH
  oxifumen decode --json v115@vhAAgH > pages.json
  oxifumen encode pages.json
  oxifumen decode --json v115@vhAAgH | oxifumen encode -
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a fumen string into its pages
    #[command(alias = "d")]
    Decode {
        /// Fumen string (or URL containing one)
        fumen: String,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,
    },

    /// Encode a JSON page document into a fumen string
    #[command(alias = "e")]
    Encode {
        /// Input file produced by `decode --json`, or `-` for stdin
        input: PathBuf,
    },
}

/// JSON surface of one page.
#[derive(Serialize, Deserialize)]
struct PageDoc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    garbage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    operation: Option<OperationDoc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    flags: Option<FlagsDoc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    field_ref: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    comment_ref: Option<usize>,
}

#[derive(Serialize, Deserialize)]
struct OperationDoc {
    piece: char,
    rotation: String,
    x: i32,
    y: i32,
}

#[derive(Serialize, Deserialize)]
struct FlagsDoc {
    lock: bool,
    mirror: bool,
    colorize: bool,
    rise: bool,
    quiz: bool,
}

fn rotation_name(rotation: Rotation) -> &'static str {
    match rotation {
        Rotation::Spawn => "spawn",
        Rotation::Right => "right",
        Rotation::Reverse => "reverse",
        Rotation::Left => "left",
    }
}

fn rotation_from_name(name: &str) -> Result<Rotation, String> {
    match name {
        "spawn" => Ok(Rotation::Spawn),
        "right" => Ok(Rotation::Right),
        "reverse" => Ok(Rotation::Reverse),
        "left" => Ok(Rotation::Left),
        other => Err(format!("unknown rotation: {other}")),
    }
}

fn page_to_doc(page: &Page) -> PageDoc {
    PageDoc {
        field: page.field.as_ref().map(Field::field_string),
        garbage: page.field.as_ref().map(Field::garbage_string),
        operation: page.operation.map(|op| OperationDoc {
            piece: op.mino.name(),
            rotation: rotation_name(op.rotation).to_string(),
            x: op.x,
            y: op.y,
        }),
        comment: page.comment.clone(),
        flags: page.flags.map(|f| FlagsDoc {
            lock: f.lock,
            mirror: f.mirror,
            colorize: f.colorize,
            rise: f.rise,
            quiz: f.quiz,
        }),
        field_ref: page.refs.field,
        comment_ref: page.refs.comment,
    }
}

fn doc_to_page(doc: &PageDoc) -> Result<Page, String> {
    let field = match (&doc.field, &doc.garbage) {
        (None, None) => None,
        (field, garbage) => Some(
            Field::from_strings(
                field.as_deref().unwrap_or_default(),
                garbage.as_deref().unwrap_or_default(),
            )
            .map_err(|e| e.to_string())?,
        ),
    };
    let operation = doc
        .operation
        .as_ref()
        .map(|op| {
            let mino = Mino::from_name(op.piece)
                .filter(|m| m.is_piece())
                .ok_or_else(|| format!("unknown piece: {}", op.piece))?;
            Ok::<Operation, String>(Operation::new(
                mino,
                rotation_from_name(&op.rotation)?,
                op.x,
                op.y,
            ))
        })
        .transpose()?;
    Ok(Page {
        field,
        operation,
        comment: doc.comment.clone(),
        flags: doc.flags.as_ref().map(|f| Flags {
            lock: f.lock,
            mirror: f.mirror,
            colorize: f.colorize,
            rise: f.rise,
            quiz: f.quiz,
        }),
        refs: Refs {
            field: doc.field_ref,
            comment: doc.comment_ref,
        },
    })
}

fn cmd_decode(fumen: &str, json: bool) -> Result<(), String> {
    let pages = oxifumen::decode(fumen).map_err(|e| e.to_string())?;

    if json {
        let docs: Vec<PageDoc> = pages.iter().map(page_to_doc).collect();
        let text = serde_json::to_string_pretty(&docs).map_err(|e| e.to_string())?;
        println!("{text}");
        return Ok(());
    }

    for (index, page) in pages.iter().enumerate() {
        let flags = page.effective_flags();
        let mut set = Vec::new();
        for (name, on) in [
            ("lock", flags.lock),
            ("mirror", flags.mirror),
            ("colorize", flags.colorize),
            ("rise", flags.rise),
            ("quiz", flags.quiz),
        ] {
            if on {
                set.push(name);
            }
        }
        println!("Page {index} [{}]", set.join(", "));
        if let Some(op) = page.operation {
            println!(
                "  operation: {} {} at ({}, {})",
                op.mino.name(),
                rotation_name(op.rotation),
                op.x,
                op.y
            );
        }
        match &page.comment {
            Some(comment) if !comment.is_empty() => println!("  comment: {comment}"),
            _ => {}
        }
        if let Some(field) = &page.field {
            let board = field.string(true, true, "\n  ");
            if board.is_empty() {
                println!("  (empty field)");
            } else {
                println!("  {board}");
            }
        }
    }
    Ok(())
}

fn cmd_encode(input: &PathBuf) -> Result<(), String> {
    let text = if input.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| e.to_string())?;
        buf
    } else {
        std::fs::read_to_string(input).map_err(|e| e.to_string())?
    };

    let docs: Vec<PageDoc> = serde_json::from_str(&text).map_err(|e| e.to_string())?;
    let pages = docs
        .iter()
        .map(doc_to_page)
        .collect::<Result<Vec<Page>, String>>()?;
    let fumen = oxifumen::encode(&pages).map_err(|e| e.to_string())?;
    println!("{fumen}");
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Decode { fumen, json } => cmd_decode(&fumen, json),
        Commands::Encode { input } => cmd_encode(&input),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_roundtrip() {
        let pages = oxifumen::decode("v115@vhBAgHAgH").unwrap();
        let docs: Vec<PageDoc> = pages.iter().map(page_to_doc).collect();
        let back: Vec<Page> = docs.iter().map(|d| doc_to_page(d).unwrap()).collect();
        assert_eq!(oxifumen::encode(&back).unwrap(), "v115@vhBAgHAgH");
    }

    #[test]
    fn test_rotation_names() {
        for rotation in [
            Rotation::Spawn,
            Rotation::Right,
            Rotation::Reverse,
            Rotation::Left,
        ] {
            let name = rotation_name(rotation);
            assert_eq!(rotation_from_name(name).unwrap(), rotation);
        }
        assert!(rotation_from_name("diagonal").is_err());
    }
}
