use crate::cli::opts::*;

use anyhow::{anyhow, Result};
use lingodeck_core::{
    Card, CardFields, CardService, Grade, ImageRef, ListQuery, PracticeInput, SystemClock,
};
use lingodeck_json::{paths, JsonStore};
use std::io::{stdin, stdout, Write};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

pub async fn run_cli(args: Cli) -> Result<()> {
    let service = open_service(&args).await?;
    match args.cmd {
        Command::Card(cmd) => card_cmd(&service, cmd).await,
        Command::Practice(cmd) => practice_cmd(&service, cmd).await,
        Command::Review(cmd) => review_cmd(&service, cmd).await,
    }
}

pub async fn open_service(args: &Cli) -> Result<CardService> {
    let file = args.data_file.clone().unwrap_or_else(paths::default_store_file);
    let backups = paths::backups_dir_for(&file);
    debug!(file = %file.display(), max_backups = args.max_backups, "opening card store");
    let store = JsonStore::open_with(file, backups, args.max_backups).await?;
    Ok(CardService::new(Arc::new(store), Arc::new(SystemClock)))
}

async fn card_cmd(service: &CardService, cmd: CardCmd) -> Result<()> {
    match cmd {
        CardCmd::Add(a) => {
            let card = service
                .create_card(CardFields {
                    front: a.front,
                    back: a.back,
                    language: a.language,
                    image: image_ref(a.image),
                })
                .await?;
            println!("{}", card.id);
        }
        CardCmd::List(l) => {
            let page = service
                .list_cards(ListQuery {
                    limit: l.limit,
                    page: l.page,
                    language: l.language,
                })
                .await?;
            for c in &page.cards {
                println!("{}", card_line(c));
            }
            if page.cards.is_empty() {
                println!("no cards");
            }
        }
        CardCmd::Show { card_id } => {
            let card = service.get_card(parse_uuid(&card_id)?).await?;
            println!("{}", serde_json::to_string_pretty(&card)?);
        }
        CardCmd::Edit(e) => {
            let card = service.get_card(parse_uuid(&e.card_id)?).await?;
            let image = if e.clear_image {
                None
            } else {
                image_ref(e.image).or(card.image)
            };
            let fields = CardFields {
                front: e.front.unwrap_or(card.front),
                back: e.back.unwrap_or(card.back),
                language: e.language.unwrap_or(card.language),
                image,
            };
            let card = service.modify_card(card.id, fields).await?;
            println!("{}", card_line(&card));
        }
        CardCmd::Rm { card_id } => {
            service.delete_card(parse_uuid(&card_id)?).await?;
            println!("ok");
        }
    }
    Ok(())
}

async fn practice_cmd(service: &CardService, cmd: PracticeCmd) -> Result<()> {
    let id = parse_uuid(&cmd.card_id)?;
    let card = service.practice_card(id, PracticeInput { grade: cmd.grade }).await?;
    println!("→ next due in {} day(s), {}", card.schedule.interval, card.schedule.due_date.to_rfc3339());
    Ok(())
}

async fn review_cmd(service: &CardService, cmd: ReviewCmd) -> Result<()> {
    let pool = service.due_cards(Some(cmd.max)).await?;
    if pool.is_empty() {
        println!("no cards due");
        return Ok(());
    }

    let total = pool.len();
    let mut reviewed = 0usize;
    for (i, card) in pool.into_iter().enumerate() {
        println!("\n[{}/{}] {} ({})", i + 1, total, card.id, card.language);
        println!("Q: {}", card.front);
        prompt_enter("[enter=show]")?;
        println!("A: {}", card.back);
        println!("[0-5=grade, s=skip, q=quit]");
        let grade = loop {
            let line = read_line("grade> ")?;
            match line.trim().to_lowercase().as_str() {
                "s" | "skip" => break None,
                "q" | "quit" => {
                    println!("\nreviewed {reviewed}");
                    return Ok(());
                }
                other => match review_grade(other) {
                    Some(g) => break Some(g),
                    None => println!("enter 0-5, s, or q"),
                },
            }
        };

        if let Some(grade) = grade {
            let updated = service.practice_card(card.id, PracticeInput { grade }).await?;
            reviewed += 1;
            println!("→ next due in {} day(s)", updated.schedule.interval);
        }
    }

    println!("\nreviewed {reviewed}");
    Ok(())
}

// ===== Helpers =====
fn parse_uuid(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|_| anyhow!("invalid card id: {s}"))
}

/// A grade typed at the review prompt, if it is one the scheduler accepts.
fn review_grade(input: &str) -> Option<i64> {
    let g = input.parse::<i64>().ok()?;
    Grade::new(g).ok().map(|g| i64::from(g.value()))
}

fn image_ref(args: ImageArgs) -> Option<ImageRef> {
    args.image.map(|file_name| ImageRef {
        file_name,
        backup_url: args.image_url,
    })
}

pub fn card_line(c: &Card) -> String {
    format!(
        "{}\t{}\t{}\t{}\tinterval={}\trep={}\tef={:.2}\tdue={}",
        c.id,
        c.front,
        c.back,
        c.language,
        c.schedule.interval,
        c.schedule.repetition,
        c.schedule.ease_factor,
        c.schedule.due_date.format("%Y-%m-%d %H:%M")
    )
}

fn prompt_enter(label: &str) -> Result<()> { print!("{label}"); stdout().flush().ok(); let mut s = String::new(); stdin().read_line(&mut s)?; Ok(()) }
fn read_line(prompt: &str) -> Result<String> { print!("{prompt}"); stdout().flush().ok(); let mut s = String::new(); stdin().read_line(&mut s)?; Ok(s) }
