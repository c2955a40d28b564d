//! HTML table rendering for chat response contexts, the notebook-UI output.

use serde_json::Value as JsonValue;

const HEADER_STYLE: &str = "background-color:#f0f0f0";

fn row_color(index: usize) -> &'static str {
    if index % 2 == 0 {
        "#f9f9f9"
    } else {
        "#ffffff"
    }
}

fn text(value: &JsonValue, key: &str) -> String {
    match value.get(key) {
        Some(JsonValue::String(s)) => s.clone(),
        Some(JsonValue::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

pub fn render_search_results(context: &JsonValue) -> String {
    let mut html = String::from("<h3>Search Results</h3>");
    html.push_str("<table style='width:100%; border-collapse: collapse;'>");
    html.push_str(
        &format!(
            "<tr style='{}'><th>Dataset</th><th>Title</th><th>Downloads</th></tr>",
            HEADER_STYLE
        )
    );

    let results = context
        .get("results")
        .and_then(JsonValue::as_array)
        .map(|v| v.as_slice())
        .unwrap_or(&[]);
    for (i, result) in results.iter().enumerate() {
        let dataset_ref = text(result, "ref");
        html.push_str(&format!("<tr style='background-color:{}'>", row_color(i)));
        html.push_str(
            &format!(
                "<td><a href='https://www.kaggle.com/datasets/{}'>{}</a></td>",
                dataset_ref,
                dataset_ref
            )
        );
        html.push_str(&format!("<td>{}</td>", text(result, "title")));
        html.push_str(&format!("<td>{}</td>", text(result, "download_count")));
        html.push_str("</tr>");
    }

    html.push_str("</table>");
    html
}

pub fn render_dataset_info(info: &JsonValue) -> String {
    let mut html = format!("<h3>Dataset: {}</h3>", text(info, "title"));
    html.push_str("<table style='width:100%; border-collapse: collapse;'>");
    html.push_str(&format!("<tr><td><b>Size:</b></td><td>{}</td></tr>", text(info, "size")));
    html.push_str(
        &format!("<tr><td><b>Last Updated:</b></td><td>{}</td></tr>", text(info, "lastUpdated"))
    );
    html.push_str(
        &format!(
            "<tr><td><b>Download Count:</b></td><td>{}</td></tr>",
            text(info, "downloadCount")
        )
    );
    html.push_str("</table>");

    html.push_str("<h4>Files:</h4><ul>");
    let files = info
        .get("files")
        .and_then(JsonValue::as_array)
        .map(|v| v.as_slice())
        .unwrap_or(&[]);
    for file in files {
        html.push_str(
            &format!("<li>{} ({} bytes)</li>", text(file, "name"), text(file, "size"))
        );
    }
    html.push_str("</ul>");

    if let Some(sample) = info.get("sample_data").and_then(JsonValue::as_array) {
        if !sample.is_empty() {
            html.push_str("<h4>Sample Data:</h4>");
            html.push_str(
                "<table style='width:100%; border-collapse: collapse; font-size:0.8em'>"
            );

            let headers: Vec<String> = sample[0]
                .as_object()
                .map(|row| row.keys().cloned().collect())
                .unwrap_or_default();
            html.push_str(&format!("<tr style='{}'>", HEADER_STYLE));
            for header in &headers {
                html.push_str(&format!("<th>{}</th>", header));
            }
            html.push_str("</tr>");

            for (i, row) in sample.iter().enumerate() {
                html.push_str(&format!("<tr style='background-color:{}'>", row_color(i)));
                for header in &headers {
                    html.push_str(&format!("<td>{}</td>", text(row, header)));
                }
                html.push_str("</tr>");
            }
            html.push_str("</table>");
        }
    }

    html
}

pub fn render_competition_info(info: &JsonValue) -> String {
    let mut html = format!("<h3>Competition: {}</h3>", text(info, "title"));
    html.push_str("<table style='width:100%; border-collapse: collapse;'>");
    html.push_str(&format!("<tr><td><b>Category:</b></td><td>{}</td></tr>", text(info, "category")));
    html.push_str(&format!("<tr><td><b>Deadline:</b></td><td>{}</td></tr>", text(info, "deadline")));
    html.push_str(&format!("<tr><td><b>Reward:</b></td><td>{}</td></tr>", text(info, "reward")));
    html.push_str(
        &format!("<tr><td><b>Team Count:</b></td><td>{}</td></tr>", text(info, "teamCount"))
    );
    html.push_str("</table>");
    html.push_str(&format!("<h4>Description:</h4><div>{}</div>", text(info, "description")));
    html
}
