// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .conflicts_with("jsonl")
            .help("Print pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print one JSON object per line"),
    )
}

fn transaction_fields(cmd: Command, required: bool) -> Command {
    cmd.arg(
        Arg::new("type")
            .long("type")
            .required(required)
            .help("income, expense or loan"),
    )
    .arg(Arg::new("amount").long("amount").required(required))
    .arg(Arg::new("remarks").long("remarks").required(required))
    .arg(
        Arg::new("date")
            .long("date")
            .required(required)
            .help("YYYY-MM-DD"),
    )
}

pub fn build_cli() -> Command {
    Command::new("khata")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Track income, expenses and loans with monthly reports")
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("user")
                .about("Local profiles and sign-in")
                .subcommand(
                    Command::new("register")
                        .arg(Arg::new("email").long("email").required(true))
                        .arg(Arg::new("password").long("password").required(true)),
                )
                .subcommand(
                    Command::new("login")
                        .arg(Arg::new("email").long("email").required(true))
                        .arg(Arg::new("password").long("password").required(true)),
                )
                .subcommand(Command::new("logout"))
                .subcommand(Command::new("whoami")),
        )
        .subcommand(
            Command::new("tx")
                .about("Record and browse transactions")
                .subcommand(
                    transaction_fields(Command::new("add"), true)
                        .mut_arg("date", |a| a.required(false).help("YYYY-MM-DD, defaults to today")),
                )
                .subcommand(
                    transaction_fields(Command::new("edit"), true).arg(
                        Arg::new("id")
                            .long("id")
                            .required(true)
                            .value_parser(value_parser!(i64)),
                    ),
                )
                .subcommand(
                    Command::new("rm").arg(
                        Arg::new("id")
                            .long("id")
                            .required(true)
                            .value_parser(value_parser!(i64)),
                    ),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(Arg::new("type").long("type").help("income, expense, loan or all"))
                        .arg(Arg::new("from").long("from").help("Earliest date, inclusive"))
                        .arg(Arg::new("to").long("to").help("Latest date, inclusive"))
                        .arg(
                            Arg::new("year")
                                .long("year")
                                .value_parser(value_parser!(i32)),
                        )
                        .arg(
                            Arg::new("search")
                                .long("search")
                                .help("Text in remarks or digits of the amount"),
                        )
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                )),
        )
        .subcommand(
            Command::new("report")
                .about("Dashboard figures")
                .subcommand(json_flags(
                    Command::new("monthly").arg(
                        Arg::new("year")
                            .long("year")
                            .value_parser(value_parser!(i32))
                            .help("Defaults to the current year"),
                    ),
                ))
                .subcommand(json_flags(Command::new("summary")))
                .subcommand(json_flags(Command::new("years"))),
        )
        .subcommand(
            Command::new("export").subcommand(
                Command::new("transactions")
                    .arg(
                        Arg::new("format")
                            .long("format")
                            .default_value("csv")
                            .help("csv or json"),
                    )
                    .arg(Arg::new("out").long("out").required(true)),
            ),
        )
        .subcommand(
            Command::new("import").subcommand(
                Command::new("transactions").arg(
                    Arg::new("path")
                        .long("path")
                        .required(true)
                        .help("JSON array of transaction documents"),
                ),
            ),
        )
        .subcommand(
            Command::new("currency")
                .about("Display currency")
                .subcommand(Command::new("set").arg(Arg::new("code").required(true)))
                .subcommand(Command::new("show"))
                .subcommand(Command::new("list")),
        )
        .subcommand(
            Command::new("watch")
                .about("Live monthly report that refreshes when the data changes")
                .arg(
                    Arg::new("year")
                        .long("year")
                        .value_parser(value_parser!(i32)),
                )
                .arg(
                    Arg::new("interval_ms")
                        .long("interval-ms")
                        .value_parser(value_parser!(u64).range(50..))
                        .default_value("1000"),
                ),
        )
}
