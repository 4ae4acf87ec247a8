use cutout_derive::cutout_error;
use std::borrow::Cow;

#[cutout_error]
enum ObjectError {
    #[error("Object I/O failed{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Object missing{}: {message}", format_context(.context))]
    Missing { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal object error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn failing_io() -> Result<(), std::io::Error> {
    Err(std::io::Error::other("disk gone"))
}

#[test]
fn source_errors_convert_with_question_mark() {
    fn run() -> Result<(), ObjectError> {
        failing_io()?;
        Ok(())
    }

    let err = run().expect_err("io failure should propagate");
    assert!(matches!(err, ObjectError::Io { context: None, .. }));
    assert_eq!(err.to_string(), "Object I/O failed: disk gone");
}

#[test]
fn context_is_attached_to_source_results() {
    let err = failing_io().context("writing images/a.png").expect_err("should fail");
    assert_eq!(err.to_string(), "Object I/O failed (writing images/a.png): disk gone");
}

#[test]
fn context_overrides_existing_variant_context() {
    let result: Result<(), ObjectError> =
        Err(ObjectError::Missing { message: "images/a.png".into(), context: None });

    let err = result.context("delete").expect_err("should fail");
    assert_eq!(err.to_string(), "Object missing (delete): images/a.png");
}

#[test]
fn strings_become_internal_errors() {
    let borrowed = ObjectError::from("boom");
    let owned = ObjectError::from(String::from("bang"));

    assert!(matches!(borrowed, ObjectError::Internal { .. }));
    assert_eq!(owned.to_string(), "Internal object error: bang");
}

#[test]
fn cutout_error_ui() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/cutout_error_pass.rs");
}
