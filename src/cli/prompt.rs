//! Interactive credential prompt

use std::io::{self, BufRead, Write};

use crate::s3::Credentials;

/// Ask for the access key ID and secret on `output`, reading answers from `input`.
///
/// Answers are trimmed and otherwise taken as typed: no masking, no format
/// checks, no retry. End of input gives an empty answer.
pub fn prompt_credentials<R, W>(input: &mut R, output: &mut W) -> io::Result<Credentials>
where
    R: BufRead,
    W: Write,
{
    writeln!(output, "Please enter the AWS credentials:")?;
    let access_key_id = ask(input, output, "AWS Access Key ID: ")?;
    let secret_access_key = ask(input, output, "AWS Secret Access Key: ")?;

    Ok(Credentials::new(access_key_id, secret_access_key))
}

fn ask<R, W>(input: &mut R, output: &mut W, prompt: &str) -> io::Result<String>
where
    R: BufRead,
    W: Write,
{
    write!(output, "{}", prompt)?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}
