use std::path::PathBuf;

use prompter_core::TabId;

/// One line of shell input, parsed. Lines starting with `:` are commands;
/// anything else is script text appended to the active tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Append(String),
    Open(PathBuf),
    Save(PathBuf),
    SetAlias(String),
    ContextMode(bool),
    ContextName(String),
    ContextUnit(String),
    NewTab,
    SelectTab(TabId),
    CloseTab(TabId),
    Send,
    ForceSend,
    Clear,
    SetClearMax(usize),
    Stop,
    Keepalive,
    SetKeepaliveSecs(u64),
    Show,
    Help,
    Quit,
    Invalid(String),
}

pub fn parse_line(line: &str) -> Command {
    let line = line.trim_end();
    if !line.starts_with(':') {
        return Command::Append(line.to_string());
    }

    let (name, arg) = match line.split_once(' ') {
        Some((name, arg)) => (name, arg.trim()),
        None => (line, ""),
    };

    match (name, arg) {
        (":open", path) if !path.is_empty() => Command::Open(PathBuf::from(path)),
        (":save", path) if !path.is_empty() => Command::Save(PathBuf::from(path)),
        (":alias", prefix) => Command::SetAlias(prefix.to_string()),
        (":context", "on") => Command::ContextMode(true),
        (":context", "off") => Command::ContextMode(false),
        (":ctx-name", name) => Command::ContextName(name.to_string()),
        (":ctx-unit", unit) => Command::ContextUnit(unit.to_string()),
        (":tab", "") => Command::NewTab,
        (":tab", id) => match id.parse::<TabId>() {
            Ok(tab_id) => Command::SelectTab(tab_id),
            Err(_) => Command::Invalid(line.to_string()),
        },
        (":close", id) => match id.parse::<TabId>() {
            Ok(tab_id) => Command::CloseTab(tab_id),
            Err(_) => Command::Invalid(line.to_string()),
        },
        (":send", "") => Command::Send,
        (":force", "") => Command::ForceSend,
        (":clear", "") => Command::Clear,
        (":clear-max", value) => match value.parse::<usize>() {
            Ok(max_index) => Command::SetClearMax(max_index),
            Err(_) => Command::Invalid(line.to_string()),
        },
        (":stop", "") => Command::Stop,
        (":keepalive", "") => Command::Keepalive,
        (":keepalive-secs", value) => match value.parse::<u64>() {
            Ok(secs) => Command::SetKeepaliveSecs(secs),
            Err(_) => Command::Invalid(line.to_string()),
        },
        (":show", "") => Command::Show,
        (":help", "") => Command::Help,
        (":quit", "") | (":q", "") => Command::Quit,
        _ => Command::Invalid(line.to_string()),
    }
}

pub const HELP_TEXT: &str = "\
Script text: any line not starting with ':' is appended to the active tab.
  :open <path>          load a script file into the active tab
  :save <path>          write the active tab's script to a file
  :alias <prefix>       set the alias prefix (empty disables aliasing)
  :context on|off       toggle context mode
  :ctx-name <name>      set the context name
  :ctx-unit <unit>      set the context unit
  :tab                  create a tab       :tab <id>    switch to a tab
  :close <id>           close an empty tab
  :send                 send changed commands
  :force                send every command
  :clear                deregister aliases 0..=max in the target
  :clear-max <n>        set the clear bound
  :stop                 cancel the running operation and the keepalive
  :keepalive            toggle the periodic console keepalive
  :keepalive-secs <n>   set the keepalive interval
  :show                 print the current batch preview
  :quit                 exit";
