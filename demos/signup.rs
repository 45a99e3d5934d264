//! End-to-end walkthrough of a signup form: declared fields, per-field
//! validation, a rejected submit, and a successful one.
//!
//! Run with: cargo run --example signup

use formwork::{field_keys, FieldBuilder, Form, FormSnapshot};

field_keys! {
    pub USERNAME = "username";
    pub EMAIL = "email";
}

#[derive(Clone, Debug, PartialEq)]
enum SignupError {
    Required,
    InvalidEmail,
    Backend(&'static str),
}

#[derive(Clone, Debug)]
struct Receipt {
    account: String,
}

fn describe(snapshot: &FormSnapshot<String, Receipt, SignupError>) {
    println!(
        "  state={} errors={} data={:?}",
        snapshot.state,
        snapshot.errors.len(),
        snapshot.data.as_ref().map(|receipt| &receipt.account),
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let form: Form<String, Receipt, SignupError, ()> = Form::builder()
        .field(
            FieldBuilder::new(USERNAME)
                .initial(String::new())
                .validate_with(|value: &String| {
                    if value.is_empty() {
                        Err(SignupError::Required)
                    } else {
                        Ok(())
                    }
                }),
        )?
        .field(
            FieldBuilder::new(EMAIL)
                .initial(String::new())
                .validate_with(|value: &String| {
                    if value.contains('@') {
                        Ok(())
                    } else {
                        Err(SignupError::InvalidEmail)
                    }
                }),
        )?
        .on_submit_with(|values| {
            let username = values
                .get(&USERNAME)
                .cloned()
                .ok_or(SignupError::Backend("username missing"))?;
            Ok(Receipt { account: username })
        })
        .build()?;

    let subscription = form.subscribe(|snapshot, _handlers| describe(snapshot))?;

    println!("validating an empty username:");
    form.set_field_with_validate(USERNAME, String::new(), &())
        .await?;

    println!("submitting with invalid fields:");
    form.submit(&()).await?;
    let snapshot = form.snapshot()?;
    println!(
        "  rejected: validated_with_errors={}",
        snapshot.validated_with_errors
    );

    println!("fixing the fields and resubmitting:");
    form.set_field_with_validate(USERNAME, "ada".to_string(), &())
        .await?;
    form.set_field_with_validate(EMAIL, "ada@lovelace.dev".to_string(), &())
        .await?;
    form.submit(&()).await?;

    let snapshot = form.snapshot()?;
    println!(
        "  submitted: account={:?} at {:?}",
        snapshot.data.map(|receipt| receipt.account),
        snapshot.data_updated_at,
    );

    subscription.unsubscribe();
    Ok(())
}
