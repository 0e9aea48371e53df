//! Verdict placement, aborts and watchdogs in complete documents

use selenese_ats::{Formatter, FormatterOptions, Warning};
use selenese_ats_common::{Command, TestCase};
use test_case::test_case;

fn generate(commands: Vec<Command>) -> (String, Vec<Warning>) {
    let mut test_case = TestCase::new("verdicts").with_base_url("http://sut/");
    test_case.commands = commands;
    let generated = Formatter::default().generate(&test_case).unwrap();
    (generated.text, generated.warnings)
}

#[test]
fn only_the_last_check_sets_pass() {
    let (text, _) = generate(vec![
        Command::action("open", "/", ""),
        Command::action("verifyTitle", "Home", ""),
        Command::action("storeTitle", "title", ""),
        Command::action("assertElementPresent", "id=menu", ""),
        Command::action("click", "id=menu", ""),
        Command::action("verifyText", "id=greeting", "Hello"),
        Command::action("echo", "done", ""),
    ]);

    assert_eq!(text.matches("self.setverdict(PASS)").count(), 1);
    let pass = text.find("self.setverdict(PASS)").unwrap();
    let last_check = text.find("sel.send([\"getText\", \"id=greeting\"])").unwrap();
    assert!(pass > last_check);
}

#[test]
fn store_commands_never_carry_verdicts() {
    let (text, _) = generate(vec![Command::action("storeTitle", "title", "")]);
    assert!(!text.contains("setverdict"));
    assert!(!text.contains("alt(["));
}

#[test_case("assertText", 1 ; "assert stops")]
#[test_case("verifyText", 0 ; "verify continues")]
fn value_mismatch_abort(command: &str, stops: usize) {
    let (text, _) = generate(vec![Command::action(command, "id=a", "expected")]);
    assert_eq!(text.matches("lambda: stop(),").count(), stops);
    assert_eq!(text.matches("self.setverdict(FAIL)").count(), 1);
}

#[test]
fn every_wait_has_exactly_one_terminal_watchdog() {
    let (text, _) = generate(vec![
        Command::action("waitForElementPresent", "id=a", ""),
        Command::action("waitForText", "id=b", "regexp:ready|done"),
        Command::action("waitForNotValue", "id=c", "${PX_EMPTY:none}"),
    ]);

    assert_eq!(text.matches("lambda: RETURN,").count(), 3);
    assert_eq!(text.matches("timed out!").count(), 3);
    // watchdog stops are the only stops of waitFor commands
    assert_eq!(text.matches("lambda: stop(),").count(), 3);
    for n in [2, 4, 6] {
        assert!(text.contains(&format!("t_timer{n} = Timer(60, 't_timer{n}')\n")));
        assert!(text.contains(&format!("t_timer{n}.start()\n")));
    }
}

#[test]
fn wait_timeout_follows_options() {
    let formatter = Formatter::new(FormatterOptions {
        wait_for_seconds: 15,
        ..Default::default()
    });
    let test_case = TestCase::new("t").push(Command::action("waitForVisible", "id=a", ""));
    let text = formatter.generate(&test_case).unwrap().text;
    assert!(text.contains("t_timer2 = Timer(15, 't_timer2')"));
}

#[test]
fn array_accessors_are_approximated_with_warnings() {
    let (text, warnings) = generate(vec![Command::action("verifyAllLinks", "home", "")]);

    assert!(text.contains("template = [any_or_none(), \"home\", any_or_none()]"));
    assert_eq!(warnings.len(), 2);
    assert!(matches!(warnings[0], Warning::ExperimentalCommand { index: 0, .. }));
    assert!(matches!(warnings[1], Warning::ArrayPattern { index: 0, .. }));
}

#[test]
fn timers_are_unique_within_a_document_and_reset_between_documents() {
    let commands = vec![
        Command::action("pause", "1000", ""),
        Command::action("waitForTitle", "Home", ""),
        Command::action("pause", "1000", ""),
    ];
    let (first, _) = generate(commands.clone());
    let (second, _) = generate(commands);

    assert!(first.contains("t_timer4 = Timer(1, 't_timer4')"));
    assert!(!first.contains("t_timer5"));
    assert_eq!(first, second);
}
