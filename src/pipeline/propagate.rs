use super::fields::extract_fields;
use super::types::{AttributedRow, RowKind};

/// Running header context of the sequential scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    pub registration: Option<String>,
    pub date: Option<String>,
}

/// Output of [`propagate`]: attributed rows plus what was dropped on the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Propagated {
    pub rows: Vec<AttributedRow>,
    /// Data rows seen before a registration or date marker.
    pub unattributed: usize,
    /// Attributed data rows without both an mpal and a stops token.
    pub incomplete: usize,
}

/// Forward-fill registration and date onto data rows, in document order.
///
/// `rows` yields `(line, kind)` pairs. A data row inherits the most recent
/// markers no matter how many rows separate them.
pub fn propagate<I>(rows: I) -> Propagated
where
    I: IntoIterator<Item = (usize, RowKind)>,
{
    let (_, out) = rows.into_iter().fold(
        (Context::default(), Propagated::default()),
        |(mut ctx, mut out), (line, kind)| {
            match kind {
                RowKind::RegistrationMarker(reg) => ctx.registration = Some(reg),
                RowKind::DateMarker(date) => ctx.date = Some(date),
                RowKind::DataMarker(tokens) => match (&ctx.registration, &ctx.date) {
                    (Some(registration), Some(date)) => match extract_fields(&tokens) {
                        Some(fields) => out.rows.push(AttributedRow {
                            line,
                            registration: registration.clone(),
                            date: date.clone(),
                            tokens,
                            fields,
                        }),
                        None => out.incomplete += 1,
                    },
                    _ => {
                        tracing::debug!(line, "Data row before any registration/date marker");
                        out.unattributed += 1;
                    }
                },
                RowKind::Irrelevant => {}
            }
            (ctx, out)
        },
    );
    out
}
