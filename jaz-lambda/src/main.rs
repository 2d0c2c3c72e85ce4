use jaz::output::{Output, OutputLocation, SinkOutput};
use jaz::errors::JazError;
use jaz::{run_project, ProjectFlags};
use lambda_http::{run, service_fn, tracing, Body, Error, Request, RequestExt, Response};
use parking_lot::Mutex;
use serde_json::json;
use std::io;
use std::io::{ErrorKind, Write};
use std::str::from_utf8;
use std::sync::Arc;
use uuid::Uuid;

async fn function_handler(event: Request) -> Result<Response<Body>, Error> {
    let input = match event.body() {
        Body::Empty => "",
        Body::Text(text) => text.as_str(),
        Body::Binary(binary) => from_utf8(binary).unwrap_or_default(),
    }
    .as_bytes();

    let mut flags = ProjectFlags::empty();
    if event
        .query_string_parameters_ref()
        .and_then(|params| params.first("detailed"))
        .is_some_and(|value| value == "true")
    {
        flags.insert(ProjectFlags::DETAILED_OUTPUT);
    }
    let wants_csv = event
        .headers()
        .get("accept")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|accept| accept.contains("text/csv"));

    let resp = if wants_csv {
        let output = LambdaOutput::new();
        match run_project(input, &output, None, &flags) {
            Ok(_) => Response::builder()
                .status(200)
                .header("Content-Type", "text/csv")
                .body(output.into())
                .map_err(Box::new)?,
            Err(e) => error_response(e)?,
        }
    } else {
        match run_project(input, SinkOutput, None, &flags) {
            Ok(results) => Response::builder()
                .status(200)
                .header("Content-Type", "application/json")
                .body(Body::from(serde_json::to_string(&results)?))
                .map_err(Box::new)?,
            Err(e) => error_response(e)?,
        }
    };

    Ok(resp)
}

fn error_response(error: JazError) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(422)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_string(
            &json!({"errors": [{"id": Uuid::new_v4(), "status": "422", "detail": error.to_string()}]}),
        )?))
        .map_err(Box::new)?)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    run(service_fn(function_handler)).await
}

/// This output uses a shared string that individual "file" writers (the FileLikeStringWriter type)
/// can write to - this string can then be used as the response body for the Lambda.
#[derive(Debug)]
struct LambdaOutput(Arc<Mutex<String>>);

impl LambdaOutput {
    fn new() -> Self {
        Self(Arc::new(Mutex::new(String::new())))
    }
}

impl Output for &LambdaOutput {
    fn writer_for_location(&self, location: OutputLocation) -> anyhow::Result<impl Write> {
        Ok(FileLikeStringWriter::new(self.0.clone(), location))
    }
}

impl From<LambdaOutput> for Body {
    fn from(value: LambdaOutput) -> Self {
        let string = value.0.lock().clone();
        string.into()
    }
}

/// Represents a writer for an individual "file".
struct FileLikeStringWriter {
    string: Arc<Mutex<String>>,
    location: OutputLocation,
    has_output_file_header: bool,
}

impl FileLikeStringWriter {
    fn new(string: Arc<Mutex<String>>, location: OutputLocation) -> Self {
        Self {
            string,
            location,
            has_output_file_header: false,
        }
    }
}

impl Write for FileLikeStringWriter {
    /// Writes out bytes to this "file" (part of the wider LambdaOutput string), preceded by a
    /// header line naming which output the following rows belong to.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let utf8 = from_utf8(buf)
            .map_err(|_| io::Error::new(ErrorKind::InvalidData, "Tried to write out invalid UTF-8."))?;

        let mut output_string = self.string.lock();
        if !self.has_output_file_header {
            if !output_string.is_empty() {
                output_string.push('\n');
            }
            output_string.push_str(&format!("# {}\n", self.location));
            self.has_output_file_header = true;
        }
        output_string.push_str(utf8);
        Ok(utf8.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
