use api_types::{goal::GoalNew, transaction::TransactionType};
use chrono::{DateTime, Utc};
use fti_sync::{
    goals::parse_date, mutator::Mutation, scheduler::Visibility, settings::AlertToggle,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Mutate(Mutation),
    Toggle(AlertToggle),
    Visibility(Visibility),
    Refresh,
    Categories,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  +AMOUNT description #Category   add income
  -AMOUNT description #Category   add expense (a bare amount is an expense too)
  budget AMOUNT                   set this month's budget
  goal NAME|TARGET|CURRENT|DATE   save a goal (DATE is YYYY-MM-DD)
  delete-goal ID                  delete a goal (asks for confirmation)
  toggle budget|large|goal|recurring
  hide | show                     pause or resume background refresh
  categories | refresh | help | quit";

pub fn parse(input: &str, now: DateTime<Utc>) -> Result<Command, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err("Type a command, or `help`.".to_string());
    }

    let (word, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (trimmed, ""),
    };

    match word.to_lowercase().as_str() {
        "quit" | "q" | "exit" => Ok(Command::Quit),
        "help" | "?" => Ok(Command::Help),
        "refresh" | "r" => Ok(Command::Refresh),
        "categories" => Ok(Command::Categories),
        "hide" => Ok(Command::Visibility(Visibility::Hidden)),
        "show" => Ok(Command::Visibility(Visibility::Visible)),
        "toggle" => parse_toggle(rest).map(Command::Toggle),
        "budget" => {
            let amount = parse_amount(rest)?;
            Ok(Command::Mutate(Mutation::budget(amount, now)))
        }
        "goal" => parse_goal(rest).map(|goal| Command::Mutate(Mutation::SaveGoal(goal))),
        "delete-goal" => {
            if rest.is_empty() {
                return Err("Missing goal id.".to_string());
            }
            Ok(Command::Mutate(Mutation::DeleteGoal {
                id: rest.to_string(),
            }))
        }
        _ => parse_quick_add(trimmed).map(Command::Mutate),
    }
}

fn parse_quick_add(input: &str) -> Result<Mutation, String> {
    let (kind, rest) = if let Some(stripped) = input.strip_prefix('+') {
        (TransactionType::Income, stripped.trim_start())
    } else if let Some(stripped) = input.strip_prefix('-') {
        (TransactionType::Expense, stripped.trim_start())
    } else {
        (TransactionType::Expense, input)
    };

    let (amount_raw, note_raw) = match rest.split_once(' ') {
        Some((amount, note)) => (amount.trim(), note.trim()),
        None => (rest.trim(), ""),
    };
    if amount_raw.is_empty() {
        return Err("Missing amount.".to_string());
    }
    let amount = parse_amount(amount_raw)?;

    let (category, description) = parse_tag(note_raw)?;
    Ok(Mutation::transaction(
        kind,
        amount,
        description.as_deref().unwrap_or_default(),
        category.as_deref(),
    ))
}

fn parse_amount(raw: &str) -> Result<f64, String> {
    let amount: f64 = raw
        .trim()
        .replace(',', ".")
        .parse()
        .map_err(|_| format!("Invalid amount: {raw}"))?;
    if !amount.is_finite() || amount <= 0.0 {
        return Err("Amount must be > 0.".to_string());
    }
    Ok(amount)
}

fn parse_tag(note_raw: &str) -> Result<(Option<String>, Option<String>), String> {
    if note_raw.is_empty() {
        return Ok((None, None));
    }

    let mut tag: Option<String> = None;
    let mut kept: Vec<&str> = Vec::new();

    for token in note_raw.split_whitespace() {
        if let Some(rest) = token.strip_prefix('#') {
            if rest.is_empty() {
                kept.push(token);
                continue;
            }
            if tag.is_some() {
                return Err("Too many categories: one # tag at most.".to_string());
            }
            tag = Some(rest.to_string());
        } else {
            kept.push(token);
        }
    }

    let note = kept.join(" ");
    let note = if note.is_empty() { None } else { Some(note) };
    Ok((tag, note))
}

fn parse_toggle(raw: &str) -> Result<AlertToggle, String> {
    match raw.to_lowercase().as_str() {
        "budget" => Ok(AlertToggle::Budget),
        "large" | "large-transaction" => Ok(AlertToggle::LargeTransaction),
        "goal" => Ok(AlertToggle::Goal),
        "recurring" => Ok(AlertToggle::Recurring),
        other => Err(format!("Unknown alert toggle: {other}")),
    }
}

fn parse_goal(raw: &str) -> Result<GoalNew, String> {
    let parts: Vec<&str> = raw.split('|').map(str::trim).collect();
    let [name, target, current, date] = parts.as_slice() else {
        return Err("Usage: goal NAME|TARGET|CURRENT|YYYY-MM-DD".to_string());
    };
    if name.is_empty() {
        return Err("Goal name is required.".to_string());
    }
    let target_amount = parse_amount(target)?;
    let current_amount = match *current {
        "" => 0.0,
        value => value
            .replace(',', ".")
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .ok_or_else(|| format!("Invalid amount: {value}"))?,
    };
    if parse_date(date).is_none() {
        return Err(format!("Invalid date: {date}"));
    }

    Ok(GoalNew {
        name: name.to_string(),
        target_amount,
        current_amount,
        target_date: date.to_string(),
    })
}
