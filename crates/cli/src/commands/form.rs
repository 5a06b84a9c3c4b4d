//! Interactive add/edit wizard.

use std::io::{self, BufRead, Write};

use rubico_app::{AppError, CustomerApp, Step, StepOutcome, SubmitStatus};
use rubico_core::{CustomerForm, Field};

use super::{Prompter, report_notice};

const REVIEW_CHOICES: &str = "[s]ubmit, [b]ack, edit [p]ersonal, edit [a]ddress, [c]ancel: ";

/// Drive the wizard already opened on `app` until it is submitted or
/// abandoned. Returns `true` if a customer was saved.
///
/// # Errors
///
/// Returns an error if reading or writing fails or the email uniqueness
/// check cannot run.
pub async fn run<R: BufRead, W: Write>(
    app: &mut CustomerApp,
    prompt: &mut Prompter<R, W>,
) -> Result<bool, AppError> {
    loop {
        let Some(wizard) = app.wizard_mut() else {
            return Ok(false);
        };
        let step = wizard.step();
        prompt.say("")?;
        prompt.say(&format!("Step {} of 3: {}", step.number(), step.title()))?;

        if step != Step::Review {
            if !fill_step(wizard.form_mut(), prompt, step)? {
                return cancel(app, prompt);
            }
            if app.next_step().await? == StepOutcome::Blocked {
                print_errors(app, prompt)?;
            }
            continue;
        }

        for (label, value) in wizard.review().rows() {
            prompt.say(&format!("  {label}: {value}"))?;
        }
        let Some(choice) = prompt.ask(REVIEW_CHOICES)? else {
            return cancel(app, prompt);
        };

        match choice.trim().to_ascii_lowercase().as_str() {
            "s" | "submit" => match app.submit_form().await? {
                SubmitStatus::Saved(customer) => {
                    report_notice(app, prompt.output())?;
                    prompt.say(&format!("ID: {}", customer.id))?;
                    return Ok(true);
                }
                SubmitStatus::Invalid => print_errors(app, prompt)?,
                SubmitStatus::Failed => {
                    report_notice(app, prompt.output())?;
                    return Ok(false);
                }
            },
            "b" | "back" => {
                app.back_step()?;
            }
            "p" | "personal" => app.jump_to(Step::Personal)?,
            "a" | "address" => app.jump_to(Step::Address)?,
            "c" | "cancel" => return cancel(app, prompt),
            _ => prompt.say("Unknown choice.")?,
        }
    }
}

/// Prompt for the inputs of `step`. Returns `false` at end of input.
fn fill_step<R: BufRead, W: Write>(
    form: &mut CustomerForm,
    prompt: &mut Prompter<R, W>,
    step: Step,
) -> io::Result<bool> {
    match step {
        Step::Personal => {
            for (field, value) in [
                (Field::FullName, &mut form.full_name),
                (Field::Email, &mut form.email),
                (Field::Phone, &mut form.phone),
            ] {
                let Some(answer) = prompt.ask_field(field.label(), value)? else {
                    return Ok(false);
                };
                *value = answer;
            }
        }
        Step::Address => {
            let Some(billing) = prompt.ask_field(Field::BillingAddress.label(), &form.billing_address)?
            else {
                return Ok(false);
            };
            form.billing_address = billing;

            let Some(same) = prompt.confirm("Shipping same as billing?", form.shipping_same_as_billing)?
            else {
                return Ok(false);
            };
            form.shipping_same_as_billing = same;

            if !same {
                let Some(shipping) =
                    prompt.ask_field(Field::ShippingAddress.label(), &form.shipping_address)?
                else {
                    return Ok(false);
                };
                form.shipping_address = shipping;
            }
        }
        Step::Review => {}
    }
    Ok(true)
}

fn print_errors<R: BufRead, W: Write>(
    app: &CustomerApp,
    prompt: &mut Prompter<R, W>,
) -> io::Result<()> {
    let Some(wizard) = app.wizard() else {
        return Ok(());
    };
    for (field, message) in wizard.errors().iter() {
        prompt.say(&format!("  ! {}: {message}", field.label()))?;
    }
    Ok(())
}

fn cancel<R: BufRead, W: Write>(
    app: &mut CustomerApp,
    prompt: &mut Prompter<R, W>,
) -> Result<bool, AppError> {
    app.cancel_form();
    prompt.say("Cancelled.")?;
    Ok(false)
}
