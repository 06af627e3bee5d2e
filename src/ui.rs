use crate::models::EventKind;
use crate::stats::TimeRange;

pub fn render_index() -> String {
    INDEX_HTML
        .replace("{{STYLE}}", SHARED_STYLE)
        .replace("{{EMOTIONAL}}", EventKind::Emotional.as_str())
        .replace("{{BACKGROUND}}", EventKind::Background.as_str())
}

pub fn render_stats() -> String {
    let pills: String = TimeRange::ALL
        .iter()
        .map(|range| {
            let active = if *range == TimeRange::Day { " active" } else { "" };
            format!(
                r#"<button class="pill{active}" type="button" data-range="{range}">{range}</button>"#
            )
        })
        .collect();

    STATS_HTML
        .replace("{{STYLE}}", SHARED_STYLE)
        .replace("{{PILLS}}", &pills)
        .replace("{{DEFAULT_RANGE}}", TimeRange::Day.as_str())
        .replace("{{EMPTY_MESSAGE}}", EMPTY_MESSAGE)
}

const EMPTY_MESSAGE: &str = "No data logged yet. Go back and log how you feel!";

const SHARED_STYLE: &str = r#"
    :root {
      --bg: #101521;
      --card: #1a2233;
      --ink: #f4f6fb;
      --muted: #8b93a7;
      --emotional: #ff0055;
      --background: #00d2ff;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, #1f2a44, var(--bg) 65%);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 28px 16px 40px;
    }

    .app {
      width: min(760px, 100%);
      display: grid;
      gap: 24px;
    }

    header {
      display: flex;
      align-items: center;
      justify-content: space-between;
      gap: 12px;
    }

    h1 {
      margin: 0;
      font-size: clamp(1.6rem, 4vw, 2.2rem);
    }

    a.nav {
      color: var(--muted);
      text-decoration: none;
      font-weight: 600;
    }

    .status {
      min-height: 1.2em;
      color: var(--muted);
      text-align: center;
    }
"#;

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Anxiety Tracker</title>
  <style>
{{STYLE}}
    .actions {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(220px, 1fr));
      gap: 18px;
    }

    .actions form {
      margin: 0;
    }

    .log-btn {
      width: 100%;
      aspect-ratio: 1;
      border: none;
      border-radius: 28px;
      font-size: 1.3rem;
      font-weight: 700;
      color: white;
      cursor: pointer;
      transition: transform 150ms ease;
    }

    .log-btn:active {
      transform: scale(0.97);
    }

    .log-btn.emotional {
      background: var(--emotional);
    }

    .log-btn.background {
      background: var(--background);
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>How is it right now?</h1>
      <a class="nav" href="/stats">Stats &rarr;</a>
    </header>

    <section class="actions">
      <form method="post" action="/log/{{EMOTIONAL}}" data-type="{{EMOTIONAL}}">
        <button class="log-btn emotional" type="submit">Emotional</button>
      </form>
      <form method="post" action="/log/{{BACKGROUND}}" data-type="{{BACKGROUND}}">
        <button class="log-btn background" type="submit">Background</button>
      </form>
    </section>

    <div class="status" id="status"></div>
  </main>

  <script>
    const statusEl = document.getElementById('status');

    const log = async (type) => {
      const res = await fetch('/api/events', {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify({ type })
      });
      if (!res.ok) {
        const msg = await res.text();
        throw new Error(msg || 'Request failed');
      }
      statusEl.textContent = `Logged ${type}`;
      setTimeout(() => { statusEl.textContent = ''; }, 1500);
    };

    document.querySelectorAll('form[data-type]').forEach((form) => {
      form.addEventListener('submit', (event) => {
        event.preventDefault();
        log(form.dataset.type).catch((err) => { statusEl.textContent = err.message; });
      });
    });
  </script>
</body>
</html>
"#;

const STATS_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Anxiety Tracker &middot; Stats</title>
  <style>
{{STYLE}}
    .pills {
      display: flex;
      gap: 6px;
      padding: 6px;
      background: var(--card);
      border-radius: 999px;
    }

    .pill {
      border: none;
      border-radius: 999px;
      padding: 8px 14px;
      background: transparent;
      color: var(--muted);
      font-weight: 600;
      text-transform: capitalize;
      cursor: pointer;
    }

    .pill.active {
      background: var(--ink);
      color: var(--bg);
    }

    .chart-card {
      background: var(--card);
      border-radius: 20px;
      padding: 16px;
    }

    #chart {
      width: 100%;
      height: 280px;
      display: block;
    }

    .line {
      fill: none;
      stroke-width: 3;
    }

    .line.emotional {
      stroke: var(--emotional);
    }

    .line.background {
      stroke: var(--background);
    }

    .grid {
      stroke: rgba(255, 255, 255, 0.08);
    }

    .axis-label {
      fill: var(--muted);
      font-size: 11px;
    }

    .totals {
      display: flex;
      gap: 24px;
      justify-content: center;
      font-weight: 600;
    }

    .totals .emotional {
      color: var(--emotional);
    }

    .totals .background {
      color: var(--background);
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <a class="nav" href="/">&larr; Back</a>
      <div class="pills">{{PILLS}}</div>
    </header>

    <div class="chart-card">
      <svg id="chart" viewBox="0 0 600 280" aria-label="Event chart" role="img"></svg>
    </div>

    <div class="totals">
      <span class="emotional">Emotional: <span id="total-emotional">0</span></span>
      <span class="background">Background: <span id="total-background">0</span></span>
    </div>

    <div class="status" id="status"></div>
  </main>

  <script>
    const chartEl = document.getElementById('chart');
    const statusEl = document.getElementById('status');
    const pills = Array.from(document.querySelectorAll('.pill'));
    const SERIES = ['emotional', 'background'];

    const renderEmpty = (message) => {
      chartEl.innerHTML = `<text class="axis-label" x="50%" y="50%" text-anchor="middle">${message}</text>`;
    };

    const renderChart = (buckets) => {
      if (!buckets.length) {
        renderEmpty('No data');
        return;
      }

      const width = 600;
      const height = 280;
      const padX = 36;
      const padY = 30;
      const top = 16;
      const max = Math.max(1, ...buckets.flatMap((b) => SERIES.map((key) => b[key])));
      const step = buckets.length > 1 ? (width - padX * 2) / (buckets.length - 1) : 0;
      const x = (i) => padX + i * step;
      const y = (value) => height - padY - (value / max) * (height - top - padY);

      let grid = '';
      for (let i = 0; i <= 4; i += 1) {
        const value = (max * i) / 4;
        grid += `<line class="grid" x1="${padX}" y1="${y(value)}" x2="${width - padX}" y2="${y(value)}" />`;
        grid += `<text class="axis-label" x="${padX - 8}" y="${y(value) + 4}" text-anchor="end">${Math.round(value * 10) / 10}</text>`;
      }

      const lines = SERIES.map((key) => {
        const d = buckets.map((b, i) => `${i === 0 ? 'M' : 'L'} ${x(i).toFixed(2)} ${y(b[key]).toFixed(2)}`).join(' ');
        return `<path class="line ${key}" d="${d}" />`;
      }).join('');

      const every = Math.ceil(buckets.length / 12);
      const labels = buckets
        .map((b, i) => (i % every === 0
          ? `<text class="axis-label" x="${x(i)}" y="${height - padY + 18}" text-anchor="middle">${b.label}</text>`
          : ''))
        .join('');

      chartEl.innerHTML = grid + lines + labels;
    };

    const renderTotals = (buckets) => {
      SERIES.forEach((key) => {
        const total = buckets.reduce((acc, b) => acc + b[key], 0);
        document.getElementById(`total-${key}`).textContent = total;
      });
    };

    const load = async (range) => {
      const [statsRes, eventsRes] = await Promise.all([
        fetch(`/api/stats?range=${encodeURIComponent(range)}`),
        fetch('/api/events')
      ]);
      if (!statsRes.ok || !eventsRes.ok) {
        throw new Error('Unable to load stats');
      }
      const buckets = await statsRes.json();
      const events = await eventsRes.json();
      if (events.length) {
        renderChart(buckets);
      } else {
        renderEmpty('{{EMPTY_MESSAGE}}');
      }
      renderTotals(buckets);
      statusEl.textContent = '';
    };

    const select = (range) => {
      pills.forEach((pill) => pill.classList.toggle('active', pill.dataset.range === range));
      load(range).catch((err) => { statusEl.textContent = err.message; });
    };

    pills.forEach((pill) => pill.addEventListener('click', () => select(pill.dataset.range)));
    select('{{DEFAULT_RANGE}}');
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_posts_each_kind() {
        let html = render_index();
        assert!(html.contains(r#"action="/log/emotional""#));
        assert!(html.contains(r#"action="/log/background""#));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn stats_page_offers_every_range() {
        let html = render_stats();
        for range in TimeRange::ALL {
            assert!(html.contains(&format!(r#"data-range="{range}""#)));
        }
        assert!(html.contains(EMPTY_MESSAGE));
        assert!(html.contains("fetch('/api/events')"));
        assert!(!html.contains("{{"));
    }
}
