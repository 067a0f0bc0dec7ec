use crate::models::Submission;

use super::OutgoingMail;

pub const ENQUIRY_SUBJECT: &str = "SALES ENQUIRY";
const NO_PHONE: &str = "Not provided";

/// Build the sales enquiry email. The text part uses the raw values; the HTML
/// part only ever sees escaped ones.
pub fn render_enquiry(submission: &Submission) -> OutgoingMail {
    OutgoingMail {
        subject: ENQUIRY_SUBJECT.to_string(),
        text: render_enquiry_text(submission),
        html: render_enquiry_html(submission),
    }
}

fn render_enquiry_text(submission: &Submission) -> String {
    let Submission {
        name,
        email,
        phone,
        message,
    } = submission;
    let phone = phone.as_deref().unwrap_or(NO_PHONE);

    format!(
        "Name : {name}
Phone Number : {phone}
Email : {email}

Message : {message}
"
    )
}

fn render_enquiry_html(submission: &Submission) -> String {
    let escaped = submission.escaped();
    let name = escaped.name;
    let email = escaped.email;
    let phone = escaped.phone.as_deref().unwrap_or(NO_PHONE);
    let message = escaped.message;

    format!(
        r#"<h3>{ENQUIRY_SUBJECT}</h3>
<p><strong>Name :</strong> {name}</p>
<p><strong>Phone Number :</strong> {phone}</p>
<p><strong>Email :</strong> {email}</p>
<br/>
<p><strong>Message :</strong></p>
<p>{message}</p>
"#
    )
}
