/// Landing page served at `/`. Posts the question to `/query` and renders
/// the JSON answer in place.
pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>docrag</title>
<style>
  body { font-family: system-ui, sans-serif; max-width: 640px; margin: 4rem auto; padding: 0 1rem; }
  h1 { font-size: 1.4rem; }
  form { display: flex; gap: 0.5rem; }
  input { flex: 1; padding: 0.5rem; font-size: 1rem; }
  button { padding: 0.5rem 1rem; font-size: 1rem; cursor: pointer; }
  #answer { margin-top: 1.5rem; white-space: pre-wrap; line-height: 1.5; }
  .error { color: #b00020; }
</style>
</head>
<body>
<h1>Ask the documents</h1>
<form id="ask">
  <input id="question" type="text" placeholder="Type a question..." autocomplete="off" autofocus>
  <button type="submit">Ask</button>
</form>
<div id="answer"></div>
<script>
const form = document.getElementById('ask');
const answer = document.getElementById('answer');
form.addEventListener('submit', async (event) => {
  event.preventDefault();
  const query = document.getElementById('question').value.trim();
  if (!query) return;
  answer.textContent = '...';
  answer.classList.remove('error');
  try {
    const resp = await fetch('/query', {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify({ query }),
    });
    const data = await resp.json();
    if (resp.ok) {
      answer.textContent = data.answer;
    } else {
      answer.textContent = data.error || 'Request failed';
      answer.classList.add('error');
    }
  } catch (err) {
    answer.textContent = String(err);
    answer.classList.add('error');
  }
});
</script>
</body>
</html>
"#;
