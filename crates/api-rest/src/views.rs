//! HTML views rendered with tera.
//!
//! Templates are compiled into the binary so the server has no runtime template directory.

use riskview_core::Report;
use tera::{Context, Tera};

const TEMPLATES: [(&str, &str); 4] = [
    ("base.html", include_str!("../templates/base.html")),
    ("index.html", include_str!("../templates/index.html")),
    ("report.html", include_str!("../templates/report.html")),
    ("error.html", include_str!("../templates/error.html")),
];

/// The compiled template set.
#[derive(Debug)]
pub struct Views {
    tera: Tera,
}

impl Views {
    /// Compile the embedded templates.
    ///
    /// # Errors
    ///
    /// Returns a `tera::Error` if a template fails to parse.
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES)?;
        Ok(Self { tera })
    }

    /// Landing page with the transaction form.
    pub fn index(&self) -> Result<String, tera::Error> {
        self.tera.render("index.html", &Context::new())
    }

    /// Report page. The template sees `patient_details`, `transaction` and `analysis_summary`.
    pub fn report(&self, report: &Report) -> Result<String, tera::Error> {
        let context = Context::from_serialize(report)?;
        self.tera.render("report.html", &context)
    }

    /// Not-found page. Takes no data.
    pub fn error(&self) -> Result<String, tera::Error> {
        self.tera.render("error.html", &Context::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use riskview_core::{FieldValue, Record};

    #[test]
    fn test_report_renders_all_three_values() {
        let views = Views::new().expect("templates should compile");
        let report = Report {
            patient_details: Record::new(vec![
                ("Patient_ID".into(), FieldValue::Integer(3)),
                ("name".into(), FieldValue::Text("Jane".into())),
            ]),
            transaction: Record::new(vec![
                ("Transaction_ID".into(), FieldValue::Integer(7)),
                ("oldpeak".into(), FieldValue::Float(3.5)),
                ("notes".into(), FieldValue::Empty),
            ]),
            analysis_summary: "All clear".into(),
        };

        let html = views.report(&report).expect("report should render");
        assert!(html.contains("<td>Jane</td>"));
        assert!(html.contains("<td>3.5</td>"));
        assert!(html.contains("<th>notes</th>"));
        assert!(html.contains("All clear"));
    }

    #[test]
    fn test_report_escapes_dataset_text() {
        let views = Views::new().expect("templates should compile");
        let report = Report {
            patient_details: Record::new(vec![(
                "name".into(),
                FieldValue::Text("<script>".into()),
            )]),
            transaction: Record::default(),
            analysis_summary: String::new(),
        };

        let html = views.report(&report).expect("report should render");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_index_and_error_render() {
        let views = Views::new().expect("templates should compile");
        assert!(views.index().unwrap().contains("name=\"transactionId\""));
        assert!(views.error().unwrap().contains("Record not found"));
    }
}
