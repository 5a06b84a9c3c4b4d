//! Delete with confirmation.

use std::io::{BufRead, Write};

use rubico_app::{AppError, CustomerApp};
use rubico_core::CustomerId;

use super::{Prompter, report_notice};

/// Delete a loaded customer, asking first unless `assume_yes`.
/// Returns `true` if the customer was deleted.
///
/// # Errors
///
/// Returns [`AppError::NotFound`] if no loaded customer has this ID, or an
/// error if reading or writing fails.
pub async fn run<R: BufRead, W: Write>(
    app: &mut CustomerApp,
    prompt: &mut Prompter<R, W>,
    id: &CustomerId,
    assume_yes: bool,
) -> Result<bool, AppError> {
    let Some(customer) = app.customers().iter().find(|c| &c.id == id) else {
        return Err(AppError::NotFound(format!("customer {id}")));
    };
    let name = customer.full_name.clone();

    app.request_delete(id.clone());
    let confirmed = assume_yes
        || prompt
            .confirm(&format!("Delete {name}? This cannot be undone."), false)?
            .unwrap_or(false);

    if !confirmed {
        app.cancel_delete();
        prompt.say("Cancelled.")?;
        return Ok(false);
    }

    let deleted = app.confirm_delete().await;
    report_notice(app, prompt.output())?;
    Ok(deleted)
}
