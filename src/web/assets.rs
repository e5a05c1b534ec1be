// Static HTML/CSS/JS assets for the service dashboard

pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>servmon</title>
    <link rel="stylesheet" type="text/css" href="/static/style.css">
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>servmon</h1>
            <div class="controls">
                <input type="text" id="service-name" placeholder="unit name, e.g. nginx">
                <label><input type="checkbox" id="validate" checked> validate</label>
                <button id="add-service">Add</button>
                <button id="refresh">Refresh</button>
            </div>
        </div>
        <table id="services">
            <thead>
                <tr>
                    <th>Service</th>
                    <th>Load</th>
                    <th>Active</th>
                    <th>Sub</th>
                    <th>Since</th>
                    <th>Description</th>
                    <th>Actions</th>
                </tr>
            </thead>
            <tbody></tbody>
        </table>
        <pre id="logs" class="logs" hidden></pre>
    </div>
    <script src="/static/app.js"></script>
</body>
</html>
"#;

pub const STYLE_CSS: &str = r#"body {
    margin: 0;
    padding: 0;
    background-color: #282a36;
    font-family: 'Monaco', 'Menlo', 'Ubuntu Mono', monospace;
    color: #f8f8f2;
}

.container {
    max-width: 1100px;
    margin: 0 auto;
    padding: 20px;
}

.header {
    background-color: #44475a;
    padding: 10px 20px;
    border-radius: 6px;
    display: flex;
    justify-content: space-between;
    align-items: center;
    flex-wrap: wrap;
}

.header h1 {
    margin: 0;
    font-size: 18px;
}

.controls input[type="text"] {
    background-color: #282a36;
    color: #f8f8f2;
    border: 1px solid #6272a4;
    padding: 6px;
    border-radius: 4px;
}

button {
    background-color: #6272a4;
    color: #f8f8f2;
    border: none;
    padding: 6px 12px;
    border-radius: 4px;
    cursor: pointer;
}

button:hover {
    background-color: #7082b4;
}

table {
    width: 100%;
    margin-top: 20px;
    border-collapse: collapse;
}

th, td {
    text-align: left;
    padding: 8px;
    border-bottom: 1px solid #44475a;
}

.state-active { color: #50fa7b; }
.state-inactive { color: #f1fa8c; }
.state-failed, .state-unknown { color: #ff5555; }

.logs {
    margin-top: 20px;
    background-color: #1e1f29;
    padding: 12px;
    border-radius: 6px;
    max-height: 400px;
    overflow-y: auto;
    white-space: pre-wrap;
}
"#;

pub const APP_JS: &str = r#"async function refresh() {
    const response = await fetch('/api/services');
    const services = await response.json();
    const tbody = document.querySelector('#services tbody');
    tbody.innerHTML = '';
    for (const service of services) {
        const row = document.createElement('tr');
        const since = service.since ? new Date(service.since).toLocaleString() : '-';
        row.innerHTML = `
            <td>${service.name}</td>
            <td>${service.load_state}</td>
            <td class="state-${service.active_state}">${service.active_state}</td>
            <td>${service.sub_state}</td>
            <td>${since}</td>
            <td>${service.description}</td>
            <td>
                <button data-action="start">Start</button>
                <button data-action="stop">Stop</button>
                <button data-action="restart">Restart</button>
                <button data-action="logs">Logs</button>
                <button data-action="remove">Remove</button>
            </td>`;
        row.querySelectorAll('button').forEach((button) => {
            button.addEventListener('click', () => act(service.name, button.dataset.action));
        });
        tbody.appendChild(row);
    }
}

async function act(name, action) {
    if (action === 'logs') {
        const response = await fetch(`/api/services/${name}/logs?lines=100`);
        const logs = document.getElementById('logs');
        logs.textContent = await response.text();
        logs.hidden = false;
        return;
    }
    const method = action === 'remove' ? 'DELETE' : 'POST';
    const path = action === 'remove'
        ? `/api/services/${name}`
        : `/api/services/${name}/${action}`;
    const response = await fetch(path, { method });
    if (!response.ok) {
        alert(await response.text());
    }
    refresh();
}

document.getElementById('add-service').addEventListener('click', async () => {
    const name = document.getElementById('service-name').value.trim();
    const validate = document.getElementById('validate').checked;
    const response = await fetch('/api/services/add', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify({ name, validate }),
    });
    if (!response.ok) {
        alert(await response.text());
    }
    document.getElementById('service-name').value = '';
    refresh();
});

document.getElementById('refresh').addEventListener('click', refresh);
setInterval(refresh, 10000);
refresh();
"#;
