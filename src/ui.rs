use crate::gating::{Action, Gate};
use crate::session::SessionView;

pub fn render_scan_page(view: &SessionView) -> String {
    SCAN_HTML
        .replace("{{NOTICE}}", &render_notice(view))
        .replace("{{STUDENT_INPUT}}", &escape(&view.student_input))
        .replace("{{STUDENT}}", &render_student(view))
}

fn render_notice(view: &SessionView) -> String {
    match &view.notice {
        Some(notice) => format!(
            r#"<p class="notice" id="notice">{}</p>"#,
            escape(&notice.message)
        ),
        None => r#"<p class="notice" id="notice" hidden></p>"#.to_string(),
    }
}

fn render_student(view: &SessionView) -> String {
    let (Some(student), Some(displayed)) = (&view.student, &view.displayed) else {
        return match &view.selected_id {
            Some(id) => format!(r#"<p class="loading">Loading student {}…</p>"#, escape(id)),
            None => String::new(),
        };
    };

    let mut details = String::new();
    for (label, value) in [
        ("Grade", &student.grade),
        ("Main Center", &student.main_center),
        ("School", &student.school),
    ] {
        if let Some(value) = value {
            details.push_str(&format!(
                r#"<div class="info"><span>{label}</span> {}</div>"#,
                escape(value)
            ));
        }
    }

    let quiz = match &displayed.quiz_degree {
        Some(degree) => format!("Quiz: {}", escape(degree)),
        None => "Quiz: ...".to_string(),
    };
    let stamp = match (&displayed.last_attendance, displayed.attended) {
        (Some(stamp), true) => format!(
            r#"<div class="info" id="last-attendance"><span>Current Attendance:</span> {}</div>"#,
            escape(stamp)
        ),
        _ => String::new(),
    };
    let prerequisite_hint = if view.week.is_none() || view.center.is_none() {
        r#"<p class="hint">Please select both a week and attendance center to enable tracking</p>"#
    } else {
        ""
    };

    STUDENT_HTML
        .replace("{{NAME}}", &escape(&student.name))
        .replace("{{DETAILS}}", &details)
        .replace("{{ATTENDED}}", badge(displayed.attended, "Attended", "Not Attended"))
        .replace("{{HW}}", badge(displayed.hw_done, "H.W: Done", "H.W: Not Done"))
        .replace("{{PAID}}", badge(displayed.paid_session, "Paid", "Not Paid"))
        .replace("{{QUIZ}}", &quiz)
        .replace("{{STAMP}}", &stamp)
        .replace("{{CENTER}}", &escape(view.center.as_deref().unwrap_or_default()))
        .replace("{{WEEK}}", &escape(view.week.as_deref().unwrap_or_default()))
        .replace("{{HINT}}", prerequisite_hint)
        .replace(
            "{{ATTENDANCE_BUTTON}}",
            &button(
                "attendance",
                view.permissions.attendance,
                Action::Attendance,
                if displayed.attended {
                    "Mark as Not Attended"
                } else {
                    "Mark as Attended"
                },
            ),
        )
        .replace(
            "{{HW_BUTTON}}",
            &button(
                "homework",
                view.permissions.homework,
                Action::Homework,
                if displayed.hw_done {
                    "Mark as H.W Not Done"
                } else {
                    "Mark as H.W Done"
                },
            ),
        )
        .replace(
            "{{PAID_BUTTON}}",
            &button(
                "payment",
                view.permissions.payment,
                Action::Payment,
                if displayed.paid_session {
                    "Mark as Not Paid"
                } else {
                    "Mark as Paid"
                },
            ),
        )
        .replace("{{SCORE}}", &escape(&view.quiz.score))
        .replace("{{OUT_OF}}", &escape(&view.quiz.out_of))
        .replace(
            "{{QUIZ_DISABLED}}",
            match view.permissions.quiz {
                Gate::Allowed | Gate::NeedsQuizInput => "",
                _ => "disabled",
            },
        )
}

fn badge(on: bool, yes: &'static str, no: &'static str) -> &'static str {
    if on { yes } else { no }
}

fn button(action: &str, gate: Gate, kind: Action, label: &str) -> String {
    let (label, disabled) = match gate {
        Gate::Allowed => (label, ""),
        Gate::MustAttendFirst => ("Must Attend First", "disabled"),
        _ => (label, "disabled"),
    };
    let title = gate.message(kind).map(escape).unwrap_or_default();
    format!(
        r#"<form method="post" action="/scan/action"><input type="hidden" name="action" value="{action}"><button type="submit" data-gate="{}" title="{title}" {disabled}>{label}</button></form>"#,
        gate_name(gate)
    )
}

fn gate_name(gate: Gate) -> &'static str {
    match gate {
        Gate::Allowed => "allowed",
        Gate::NoStudent => "no_student",
        Gate::SelectWeekAndCenter => "select_week_and_center",
        Gate::MustAttendFirst => "must_attend_first",
        Gate::NeedsQuizInput => "needs_quiz_input",
    }
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

const STUDENT_HTML: &str = r#"<section class="student" id="student">
      <h2>{{NAME}}</h2>
      {{DETAILS}}
      <div class="badges">
        <span>{{ATTENDED}}</span>
        <span>{{HW}}</span>
        <span>{{PAID}}</span>
        <span>{{QUIZ}}</span>
      </div>
      {{STAMP}}
      <form method="post" action="/scan/action">
        <input type="hidden" name="action" value="center">
        <label>Attendance Center <input name="value" value="{{CENTER}}"></label>
        <button type="submit">Set</button>
      </form>
      <form method="post" action="/scan/action">
        <input type="hidden" name="action" value="week">
        <label>Attendance Week <input name="value" value="{{WEEK}}" placeholder="week 1"></label>
        <button type="submit">Set</button>
      </form>
      {{HINT}}
      {{ATTENDANCE_BUTTON}}
      {{HW_BUTTON}}
      {{PAID_BUTTON}}
      <form method="post" action="/scan/action" class="quiz">
        <input type="hidden" name="action" value="quiz">
        <input name="score" type="number" value="{{SCORE}}" placeholder="degree" {{QUIZ_DISABLED}}>
        <input name="out_of" type="number" value="{{OUT_OF}}" placeholder="out of" {{QUIZ_DISABLED}}>
        <button type="submit" {{QUIZ_DISABLED}}>Save quiz degree</button>
      </form>
    </section>"#;

const SCAN_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Scan Attendance</title>
</head>
<body>
  <main>
    <header>
      <h1>QR Code Scanner</h1>
      <a href="/scan/back">Back</a>
    </header>

    <form method="post" action="/scan/action">
      <input type="hidden" name="action" value="search">
      <input name="value" value="{{STUDENT_INPUT}}" placeholder="Enter student ID (e.g., 1)" autocomplete="off">
      <button type="submit">Search</button>
    </form>

    <div id="qr-reader"></div>
    {{NOTICE}}
    {{STUDENT}}
  </main>

  <script>
    const post = (path, body) =>
      fetch(path, {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify(body || {}),
        credentials: 'same-origin'
      });

    // Hooks for the embedded scanner widget.
    window.scanDesk = {
      decoded: (text) => post('/api/scan', { text }).then(() => window.location.reload()),
      failed: (error) => post('/api/scan/error', { error }).then(() => window.location.reload())
    };

    window.addEventListener('focus', () => {
      post('/api/focus').then(() => window.location.reload());
    });

    let lastPhase = null;
    setInterval(async () => {
      const response = await fetch('/api/session', { credentials: 'same-origin' });
      if (!response.ok) {
        return;
      }
      const view = await response.json();
      const snapshot = JSON.stringify([view.displayed, view.notice, view.phase]);
      if (lastPhase !== null && lastPhase !== snapshot && document.activeElement.tagName !== 'INPUT') {
        window.location.reload();
      }
      lastPhase = snapshot;
    }, 2000);
  </script>
</body>
</html>
"#;
