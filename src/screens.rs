// screens.rs
//
// One interactive screen per utility. Every screen loops on its own menu
// until `0` or a cancelled prompt; failures inside an action are printed
// and the menu comes back.

use anyhow::Context as _;
use chrono::Datelike;
use std::io;
use std::path::PathBuf;

use crate::addressbook::{AddressBook, Contact};
use crate::calc::{allowlist, Calculator};
use crate::config::DataPaths;
use crate::convert::{csv_to_json, json_to_csv};
use crate::files::FileOrganizer;
use crate::habits::{today, HabitTracker};
use crate::notes::NotesManager;
use crate::repl::{is_cancelled, Prompt};
use crate::table::pretty_table;
use crate::tasks::{TaskEdit, TaskManager, TaskOrder, DEFAULT_PRIORITY};
use crate::text::{anagrams, is_palindrome, word_stats};
use crate::tictactoe::{Game, Outcome};
use crate::timer::{
    minutes_to_seconds, pomodoro, Countdown, CountdownEnd, PomodoroPlan, TerminalCountdown,
};
use crate::util::{clear_screen, header, say, shorten, split_list};

const END_OF_TEXT: &str = "::end";

fn show_menu(title: &str, options: &str) -> io::Result<()> {
    clear_screen()?;
    header(title)?;
    say(options)
}

/// Reports the outcome of one menu action, then waits for Enter. A cancelled
/// prompt skips straight back to the menu.
fn finish(prompt: &mut Prompt, result: anyhow::Result<()>) -> anyhow::Result<()> {
    match result {
        Ok(()) => prompt.pause(),
        Err(e) if is_cancelled(&e) => Ok(()),
        Err(e) => {
            log::debug!("action failed: {:?}", e);
            say(format!("Error: {:#}", e))?;
            prompt.pause()
        }
    }
}

fn invalid_option() -> anyhow::Result<()> {
    say("Invalid option.")?;
    Ok(())
}

fn found(ok: bool, yes: &str) -> &str {
    if ok {
        yes
    } else {
        "Not found."
    }
}

fn check(done: bool) -> String {
    if done { "✔" } else { " " }.to_string()
}

pub fn tasks(prompt: &mut Prompt, paths: &DataPaths) -> anyhow::Result<()> {
    let mut tm = TaskManager::open(paths.tasks());
    loop {
        show_menu("Tasks", "1) List\n2) Add\n3) Toggle done\n4) Edit\n5) Delete\n0) Back")?;
        let result = match prompt.line("> ")?.as_str() {
            "1" => list_tasks(prompt, &tm),
            "2" => add_task(prompt, &mut tm),
            "3" => toggle_task(prompt, &mut tm),
            "4" => edit_task(prompt, &mut tm),
            "5" => delete_task(prompt, &mut tm),
            "0" => return Ok(()),
            _ => invalid_option(),
        };
        finish(prompt, result)?;
    }
}

fn list_tasks(prompt: &mut Prompt, tm: &TaskManager) -> anyhow::Result<()> {
    let tag = prompt.optional("Filter by tag (optional): ")?;
    let order: TaskOrder = prompt.parse_or("Order by [priority/due/id]: ", TaskOrder::Priority)?;
    let rows: Vec<Vec<String>> = tm
        .list(true, tag.as_deref(), order)
        .into_iter()
        .map(|t| {
            vec![
                t.id.to_string(),
                check(t.done),
                t.title.clone(),
                t.priority.to_string(),
                t.due.clone().unwrap_or_default(),
                t.tags.join(","),
            ]
        })
        .collect();
    say(pretty_table(&rows, &["ID", "OK", "Title", "Pri", "Due", "Tags"]))?;
    Ok(())
}

fn add_task(prompt: &mut Prompt, tm: &mut TaskManager) -> anyhow::Result<()> {
    let title = prompt.nonempty("Title: ")?;
    let priority: u8 = prompt.parse_or("Priority (1-5) [3]: ", DEFAULT_PRIORITY)?;
    let due = prompt.optional("Due (yyyy-mm-dd) [none]: ")?;
    let tags = split_list(&prompt.line("Tags, comma separated: ")?);
    let task = tm.add(title, priority, due, tags)?;
    say(format!("Created task #{}: {}", task.id, task.title))?;
    Ok(())
}

fn toggle_task(prompt: &mut Prompt, tm: &mut TaskManager) -> anyhow::Result<()> {
    let id: u32 = prompt.parse("ID: ")?;
    say(found(tm.toggle(id)?, "OK."))?;
    Ok(())
}

fn delete_task(prompt: &mut Prompt, tm: &mut TaskManager) -> anyhow::Result<()> {
    let id: u32 = prompt.parse("ID: ")?;
    say(found(tm.delete(id)?, "Deleted."))?;
    Ok(())
}

fn edit_task(prompt: &mut Prompt, tm: &mut TaskManager) -> anyhow::Result<()> {
    let id: u32 = prompt.parse("ID: ")?;
    let title = prompt.optional("New title (Enter keeps it): ")?;
    let priority = match prompt.optional("New priority (1-5, Enter keeps it): ")? {
        Some(p) => Some(p.parse::<u8>().with_context(|| format!("invalid priority '{}'", p))?),
        None => None,
    };
    let due = prompt.optional("New due date (yyyy-mm-dd, Enter keeps it): ")?;
    let tags = prompt
        .optional("New tags (comma separated, Enter keeps them): ")?
        .map(|t| split_list(&t));
    let edit = TaskEdit {
        title,
        priority,
        due,
        tags,
    };
    say(found(tm.edit(id, edit)?, "Updated."))?;
    Ok(())
}

pub fn notes(prompt: &mut Prompt, paths: &DataPaths) -> anyhow::Result<()> {
    let mut nm = NotesManager::open(paths.notes());
    loop {
        show_menu("Notes", "1) List\n2) Add\n3) Delete\n4) Search\n0) Back")?;
        let result = match prompt.line("> ")?.as_str() {
            "1" => list_notes(prompt, &nm),
            "2" => add_note(prompt, &mut nm),
            "3" => delete_note(prompt, &mut nm),
            "4" => search_notes(prompt, &nm),
            "0" => return Ok(()),
            _ => invalid_option(),
        };
        finish(prompt, result)?;
    }
}

fn list_notes(prompt: &mut Prompt, nm: &NotesManager) -> anyhow::Result<()> {
    let tag = prompt.optional("Filter by tag (optional): ")?;
    let rows: Vec<Vec<String>> = nm
        .list(tag.as_deref())
        .into_iter()
        .map(|n| vec![n.id.to_string(), n.title.clone(), n.tags.join(","), n.created_at.clone()])
        .collect();
    say(pretty_table(&rows, &["ID", "Title", "Tags", "Created"]))?;
    Ok(())
}

fn add_note(prompt: &mut Prompt, nm: &mut NotesManager) -> anyhow::Result<()> {
    let title = prompt.nonempty("Title: ")?;
    say(format!("Type the body (finish with a line containing only '{}'):", END_OF_TEXT))?;
    let body = prompt.multiline(END_OF_TEXT)?;
    let tags = split_list(&prompt.line("Tags, comma separated: ")?);
    let note = nm.add(title, body, tags)?;
    say(format!("Created note #{}", note.id))?;
    Ok(())
}

fn delete_note(prompt: &mut Prompt, nm: &mut NotesManager) -> anyhow::Result<()> {
    let id: u32 = prompt.parse("ID: ")?;
    say(found(nm.delete(id)?, "Deleted."))?;
    Ok(())
}

fn search_notes(prompt: &mut Prompt, nm: &NotesManager) -> anyhow::Result<()> {
    let query = prompt.nonempty("Search for: ")?;
    let rows: Vec<Vec<String>> = nm
        .search(&query)
        .into_iter()
        .map(|n| vec![n.id.to_string(), n.title.clone(), shorten(&n.body, 60), n.tags.join(",")])
        .collect();
    say(pretty_table(&rows, &["ID", "Title", "Preview", "Tags"]))?;
    Ok(())
}

pub fn habits(prompt: &mut Prompt, paths: &DataPaths) -> anyhow::Result<()> {
    let mut hb = HabitTracker::open(paths.habits());
    loop {
        show_menu(
            "Habits",
            "1) List\n2) Add habit\n3) Mark today\n4) Monthly stats\n0) Back",
        )?;
        let result = match prompt.line("> ")?.as_str() {
            "1" => list_habits(&hb),
            "2" => add_habit(prompt, &mut hb),
            "3" => mark_habit(prompt, &mut hb),
            "4" => habit_stats(prompt, &hb),
            "0" => return Ok(()),
            _ => invalid_option(),
        };
        finish(prompt, result)?;
    }
}

fn list_habits(hb: &HabitTracker) -> anyhow::Result<()> {
    let today = today();
    let rows: Vec<Vec<String>> = hb
        .list()
        .into_iter()
        .map(|h| {
            let kept = h.records.get(&today).copied().unwrap_or(false);
            vec![h.name, check(kept), h.records.len().to_string()]
        })
        .collect();
    say(pretty_table(&rows, &["Habit", "Today", "Days marked"]))?;
    Ok(())
}

fn add_habit(prompt: &mut Prompt, hb: &mut HabitTracker) -> anyhow::Result<()> {
    let name = prompt.nonempty("Habit name: ")?;
    hb.add(&name)?;
    say("Added.")?;
    Ok(())
}

fn mark_habit(prompt: &mut Prompt, hb: &mut HabitTracker) -> anyhow::Result<()> {
    let name = prompt.nonempty("Habit: ")?;
    hb.mark(&name, None, true)?;
    say("Marked for today.")?;
    Ok(())
}

fn habit_stats(prompt: &mut Prompt, hb: &HabitTracker) -> anyhow::Result<()> {
    let name = prompt.nonempty("Habit: ")?;
    let now = chrono::Local::now();
    let year: i32 = prompt.parse_or("Year (YYYY): ", now.year())?;
    let month: u32 = prompt.parse_or("Month (1-12): ", now.month())?;
    let stats = hb.monthly_stats(&name, year, month);
    say(format!("Done {}/{} ({:.1}%)", stats.done, stats.total, stats.percent))?;
    Ok(())
}

pub fn calculator(prompt: &mut Prompt, paths: &DataPaths) -> anyhow::Result<()> {
    let mut calc = Calculator::open(paths.calc_history());
    prompt.complete_with(allowlist::global().names());
    loop {
        clear_screen()?;
        header("Calculator (type 'hist' for history, '0' to go back)")?;
        let expression = prompt.line("> ")?;
        match expression.as_str() {
            "" => continue,
            "0" | "q" | "quit" => return Ok(()),
            "hist" => {
                let rows: Vec<Vec<String>> = calc
                    .recent(50)
                    .iter()
                    .map(|e| {
                        let result = e.result.as_ref().map(ToString::to_string).unwrap_or_default();
                        vec![e.expression.clone(), result]
                    })
                    .collect();
                say(pretty_table(&rows, &["Expression", "Result"]))?;
            }
            _ => match calc.evaluate(&expression) {
                Ok(value) => say(format!("= {}", value))?,
                Err(e) => say(format!("Error: {}", e))?,
            },
        }
        prompt.pause()?;
    }
}

pub fn text(prompt: &mut Prompt) -> anyhow::Result<()> {
    loop {
        show_menu(
            "Text utilities",
            "1) Count words/lines/characters\n2) Palindrome check\n3) Find anagrams\n0) Back",
        )?;
        let result = match prompt.line("> ")?.as_str() {
            "1" => text_stats(prompt),
            "2" => palindrome_check(prompt),
            "3" => find_anagrams(prompt),
            "0" => return Ok(()),
            _ => invalid_option(),
        };
        finish(prompt, result)?;
    }
}

fn text_stats(prompt: &mut Prompt) -> anyhow::Result<()> {
    say(format!("Paste or type the text (finish with '{}'):", END_OF_TEXT))?;
    let text = prompt.multiline(END_OF_TEXT)?;
    let rows: Vec<Vec<String>> = word_stats(&text)
        .rows()
        .iter()
        .map(|(name, value)| vec![name.to_string(), value.to_string()])
        .collect();
    say(pretty_table(&rows, &["Metric", "Value"]))?;
    Ok(())
}

fn palindrome_check(prompt: &mut Prompt) -> anyhow::Result<()> {
    let s = prompt.nonempty("Text: ")?;
    say(format!("Palindrome? {}", if is_palindrome(&s) { "Yes" } else { "No" }))?;
    Ok(())
}

fn find_anagrams(prompt: &mut Prompt) -> anyhow::Result<()> {
    let word = prompt.nonempty("Base word: ")?;
    let candidates = split_list(&prompt.line("Candidates, comma separated: ")?);
    let found = anagrams(&word, candidates.iter().map(String::as_str));
    let listed = if found.is_empty() {
        "(none)".to_string()
    } else {
        found.join(", ")
    };
    say(format!("Anagrams: {}", listed))?;
    Ok(())
}

pub fn convert(prompt: &mut Prompt) -> anyhow::Result<()> {
    loop {
        show_menu("JSON/CSV conversion", "1) JSON -> CSV\n2) CSV -> JSON\n0) Back")?;
        let result = match prompt.line("> ")?.as_str() {
            "1" => convert_json(prompt),
            "2" => convert_csv(prompt),
            "0" => return Ok(()),
            _ => invalid_option(),
        };
        finish(prompt, result)?;
    }
}

fn convert_json(prompt: &mut Prompt) -> anyhow::Result<()> {
    let json = PathBuf::from(prompt.nonempty("JSON file: ")?);
    let csv = PathBuf::from(prompt.nonempty("Target CSV file: ")?);
    let (rows, cols) = json_to_csv(&json, &csv)?;
    say(format!("Wrote CSV with {} rows and {} columns", rows, cols))?;
    Ok(())
}

fn convert_csv(prompt: &mut Prompt) -> anyhow::Result<()> {
    let csv = PathBuf::from(prompt.nonempty("CSV file: ")?);
    let json = PathBuf::from(prompt.nonempty("Target JSON file: ")?);
    let (rows, cols) = csv_to_json(&csv, &json)?;
    say(format!("Wrote JSON with {} objects and {} fields", rows, cols))?;
    Ok(())
}

pub fn files(prompt: &mut Prompt) -> anyhow::Result<()> {
    loop {
        show_menu("File organizer", "1) Show plan\n2) Apply (move files)\n0) Back")?;
        let result = match prompt.line("> ")?.as_str() {
            "1" => show_plan(prompt),
            "2" => organize(prompt),
            "0" => return Ok(()),
            _ => invalid_option(),
        };
        finish(prompt, result)?;
    }
}

fn show_plan(prompt: &mut Prompt) -> anyhow::Result<()> {
    let organizer = FileOrganizer::new(prompt.nonempty("Base directory: ")?);
    let plan = organizer
        .plan()
        .with_context(|| format!("cannot read {}", organizer.base().display()))?;
    let rows: Vec<Vec<String>> = plan
        .iter()
        .map(|(ext, names)| {
            let mut sample = names.iter().take(5).cloned().collect::<Vec<_>>().join(", ");
            if names.len() > 5 {
                sample.push_str(" ...");
            }
            vec![ext.clone(), names.len().to_string(), sample]
        })
        .collect();
    say(pretty_table(&rows, &["Extension", "Count", "Examples"]))?;
    Ok(())
}

fn organize(prompt: &mut Prompt) -> anyhow::Result<()> {
    let organizer = FileOrganizer::new(prompt.nonempty("Base directory: ")?);
    say("This moves files into one subfolder per extension.")?;
    if !prompt.confirm("Continue? [y/N] ")? {
        return Ok(());
    }
    let moves = organizer
        .apply(false)
        .with_context(|| format!("cannot organize {}", organizer.base().display()))?;
    say(format!("Moved {} files.", moves.len()))?;
    Ok(())
}

fn run_pomodoro(plan: PomodoroPlan) -> anyhow::Result<()> {
    let mut countdown = TerminalCountdown::new(io::stdout());
    pomodoro(&mut countdown, &mut io::stdout(), plan)?;
    Ok(())
}

fn simple_timer(prompt: &mut Prompt) -> anyhow::Result<()> {
    let minutes: u64 = prompt.parse("Minutes: ")?;
    let seconds = minutes_to_seconds(minutes)?;
    if TerminalCountdown::new(io::stdout()).run(seconds)? == CountdownEnd::Finished {
        say("Time is up!")?;
    }
    Ok(())
}

fn custom_pomodoro(prompt: &mut Prompt) -> anyhow::Result<()> {
    let plan = PomodoroPlan {
        work_minutes: prompt.parse("Work (min): ")?,
        short_break_minutes: prompt.parse("Short break (min): ")?,
        cycles: prompt.parse("Cycles: ")?,
    };
    run_pomodoro(plan)
}

pub fn timer(prompt: &mut Prompt) -> anyhow::Result<()> {
    loop {
        show_menu(
            "Timer / Pomodoro",
            "1) Simple timer (minutes)\n2) Pomodoro (25/5 x4)\n3) Custom pomodoro\n0) Back",
        )?;
        let result = match prompt.line("> ")?.as_str() {
            "1" => simple_timer(prompt),
            "2" => run_pomodoro(PomodoroPlan::default()),
            "3" => custom_pomodoro(prompt),
            "0" => return Ok(()),
            _ => invalid_option(),
        };
        finish(prompt, result)?;
    }
}

pub fn address_book(prompt: &mut Prompt, paths: &DataPaths) -> anyhow::Result<()> {
    let path = paths.address_book();
    let book = AddressBook::open(&path).with_context(|| format!("cannot open {}", path.display()))?;
    loop {
        show_menu("Address book", "1) List\n2) Add\n3) Delete\n0) Back")?;
        let result = match prompt.line("> ")?.as_str() {
            "1" => list_contacts(prompt, &book),
            "2" => add_contact(prompt, &book),
            "3" => delete_contact(prompt, &book),
            "0" => return Ok(()),
            _ => invalid_option(),
        };
        finish(prompt, result)?;
    }
}

fn list_contacts(prompt: &mut Prompt, book: &AddressBook) -> anyhow::Result<()> {
    let query = prompt.line("Filter (name/email/phone): ")?;
    let rows: Vec<Vec<String>> = book.list(&query)?.iter().map(Contact::cells).collect();
    say(pretty_table(&rows, &["ID", "Name", "Email", "Phone", "Created"]))?;
    Ok(())
}

fn add_contact(prompt: &mut Prompt, book: &AddressBook) -> anyhow::Result<()> {
    let name = prompt.nonempty("Name: ")?;
    let email = prompt.line("Email: ")?;
    let phone = prompt.line("Phone: ")?;
    let id = book.add(&name, &email, &phone)?;
    say(format!("Contact #{} added.", id))?;
    Ok(())
}

fn delete_contact(prompt: &mut Prompt, book: &AddressBook) -> anyhow::Result<()> {
    let id: i64 = prompt.parse("ID: ")?;
    say(found(book.delete(id)?, "Deleted."))?;
    Ok(())
}

fn draw_board(game: &Game) -> io::Result<()> {
    clear_screen()?;
    header("Tic-tac-toe - positions 1..9")?;
    say(game.render())
}

pub fn tictactoe(prompt: &mut Prompt) -> anyhow::Result<()> {
    let mut game = Game::new();
    draw_board(&game)?;
    loop {
        let input = prompt.line(&format!("Player {}, position (1-9) or 'q' to quit: ", game.current()))?;
        if matches!(input.to_lowercase().as_str(), "q" | "quit") {
            return Ok(());
        }
        let pos = match input.parse::<usize>() {
            Ok(n @ 1..=9) => n - 1,
            _ => {
                say("Invalid input.")?;
                continue;
            }
        };
        if !game.play(pos) {
            say("Cell taken.")?;
            continue;
        }
        draw_board(&game)?;
        match game.outcome() {
            Outcome::InProgress => continue,
            Outcome::Winner(mark) => say(format!("Player '{}' wins!", mark))?,
            Outcome::Draw => say("It's a draw!")?,
        }
        return prompt.pause();
    }
}
