mod cli;

use std::fs;
use std::io::{self, BufRead, Write};

use clap::Parser;
use cli::Cli;
use vdisk::{Command, Dispatcher};

fn main() -> io::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut dispatcher = Dispatcher::new();

    if let Some(script) = &cli.file {
        log::info!("ejecutando script {}", script.display());
        for line in fs::read_to_string(script)?.lines() {
            run_line(&mut dispatcher, line);
        }
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!(">>> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        run_line(&mut dispatcher, &line);
    }

    Ok(())
}

/// 空行与 `#` 注释直接跳过；出错打印后继续读下一行
fn run_line(dispatcher: &mut Dispatcher, line: &str) {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return;
    }

    let tokens = split_line(line);
    match Command::from_tokens(&tokens).and_then(|cmd| dispatcher.exec(cmd)) {
        Ok(msg) => println!("{msg}"),
        Err(e) => println!("Error: {e}"),
    }
}

/// 按空格切词；双引号内的空格不断词，引号原样保留，
/// 旗标解析时再剥除
fn split_line(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in input.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            ' ' if !in_quotes => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::split_line;

    #[test]
    fn splits_on_spaces() {
        assert_eq!(
            split_line("mkdisk -size=5 -path=/tmp/d.mia"),
            vec!["mkdisk", "-size=5", "-path=/tmp/d.mia"]
        );
    }

    #[test]
    fn quotes_keep_spaces() {
        assert_eq!(
            split_line("mkfile -cont=\"hola mundo\" -path=/a.txt"),
            vec!["mkfile", "-cont=\"hola mundo\"", "-path=/a.txt"]
        );
    }

    #[test]
    fn collapses_repeated_spaces() {
        assert_eq!(split_line("logout   "), vec!["logout"]);
    }
}
