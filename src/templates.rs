//! Sample generated fragments for testing and demonstration.
//!
//! They look like what the model returns for the system prompt: JSX-style
//! inline styles, no wrapper elements, occasionally fenced.

/// Business deck covering every tag the walker understands.
pub fn business_fragment() -> &'static str {
    r##"<h1 style={{ "color": "#1a365d" }}>Remote Work Strategy 2025</h1>
<h2>Introduction</h2>
<p>Hybrid work is now the <strong>default</strong> for most knowledge teams.</p>
<h2>Key Benefits</h2>
<ul>
  <li>Access to a wider talent pool</li>
  <li>Lower office costs</li>
  <li>Higher reported focus time</li>
</ul>
<h3>Productivity Findings</h3>
<p>Teams with <em>clear async norms</em> shipped 18% more features per quarter.</p>
<table style={{ "border": "1px solid #ddd" }}>
  <thead>
    <tr>
      <th style={{ "border": "1px solid #ddd", "padding": "8px" }}>Metric</th>
      <th style={{ "border": "1px solid #ddd", "padding": "8px" }}>2023</th>
      <th style={{ "border": "1px solid #ddd", "padding": "8px" }}>2024</th>
    </tr>
  </thead>
  <tbody>
    <tr><td style={{ "border": "1px solid #ddd" }}>Retention</td><td>88%</td><td>92%</td></tr>
    <tr><td style={{ "border": "1px solid #ddd" }}>Office spend</td><td>$1.2M</td><td>$0.8M</td></tr>
    <tr><td style={{ "border": "1px solid #ddd" }}>eNPS</td><td>21</td><td>34</td></tr>
  </tbody>
</table>
<h2>Next Steps</h2>
<ol>
  <li>Publish the async communication guide</li>
  <li>Pilot core collaboration hours</li>
  <li>Review results after one quarter</li>
</ol>
<img alt="Adoption chart" width="300" height="200" src="https://example.com/adoption.png" />
<p>Hybrid work pays off when <strong>norms</strong> are explicit.</p>"##
}

/// Long fragment that spills over several slides.
pub fn long_fragment() -> &'static str {
    r##"<h1>Onboarding Handbook</h1>
<h2>Week One</h2>
<ol>
  <li>Collect laptop and badge</li><li>Meet your buddy</li><li>Set up accounts</li>
  <li>Read the engineering guide</li><li>Join team channels</li><li>Shadow a stand-up</li>
  <li>Pair on a small fix</li><li>Ship the fix</li><li>Write a short retro</li>
</ol>
<h2>Week Two</h2>
<ul>
  <li>Own a small feature</li><li>Attend design review</li><li>Present at demo day</li>
  <li>Meet the support team</li><li>Read incident runbooks</li><li>Join on-call shadowing</li>
  <li>Update documentation</li><li>Plan week three</li>
</ul>
<h2>Tooling</h2>
<table>
  <thead><tr><th>Tool</th><th>Purpose</th></tr></thead>
  <tbody>
    <tr><td>Git</td><td>Source control</td></tr>
    <tr><td>CI</td><td>Builds and tests</td></tr>
    <tr><td>Tracker</td><td>Planning</td></tr>
    <tr><td>Wiki</td><td>Documentation</td></tr>
    <tr><td>Pager</td><td>Incidents</td></tr>
    <tr><td>Chat</td><td>Communication</td></tr>
  </tbody>
</table>
<h3>Questions</h3>
<p>Ask your buddy first, then your manager.</p>"##
}

/// The business fragment as a model often returns it: inside a code fence.
pub fn fenced_fragment() -> String {
    format!("```html\n{}\n```", business_fragment())
}

/// All bundled templates by name, for the CLI `demo` command.
pub fn all_templates() -> Vec<(&'static str, String)> {
    vec![
        ("business", business_fragment().to_string()),
        ("long", long_fragment().to_string()),
        ("fenced", fenced_fragment()),
    ]
}
