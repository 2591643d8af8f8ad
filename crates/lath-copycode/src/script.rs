//! Standalone browser script for real pages.

use crate::surface::{CONFIRMED, HINT_ATTR, PROMPT};

/// Generate the browser-side script implementing the copy affordance.
///
/// Targets highlighted code blocks (`.highlight > pre`), skipping blocks
/// whose parent is a `linenodiv` line-number gutter. Selection is read via
/// `window.getSelection` with the legacy `document.selection` fallback, and
/// the copy goes through an off-tree textarea plus `execCommand('copy')` so
/// it works without a secure-context clipboard API.
pub fn browser_script() -> String {
    format!(
        r#"(function () {{
  'use strict';

  var HINT = '{attr}';
  var PROMPT = '{prompt}';
  var CONFIRMED = '{confirmed}';

  function selectionText() {{
    if (window.getSelection) {{
      return window.getSelection().toString();
    }}
    if (document.selection && document.selection.type !== 'Control') {{
      return document.selection.createRange().text;
    }}
    return '';
  }}

  function copyToClipboard(text) {{
    if (!document.body) {{
      return false;
    }}
    var stage = document.createElement('textarea');
    stage.value = text;
    document.body.appendChild(stage);
    stage.select();
    var copied = false;
    try {{
      copied = document.execCommand('copy');
    }} catch (err) {{
      copied = false;
    }}
    document.body.removeChild(stage);
    return copied;
  }}

  function inGutter(block) {{
    return block.parentElement &&
      block.parentElement.classList.contains('linenodiv');
  }}

  function attach(block) {{
    if (inGutter(block)) {{
      return;
    }}
    block.addEventListener('mouseenter', function () {{
      block.setAttribute(HINT, PROMPT);
    }});
    block.addEventListener('mouseup', function () {{
      block.setAttribute(HINT, PROMPT);
      if (selectionText().trim().length > 0) {{
        return;
      }}
      if (copyToClipboard(block.textContent)) {{
        block.setAttribute(HINT, CONFIRMED);
      }}
    }});
  }}

  var blocks = document.querySelectorAll('.highlight > pre');
  for (var i = 0; i < blocks.length; i++) {{
    attach(blocks[i]);
  }}
}})();
"#,
        attr = HINT_ATTR,
        prompt = PROMPT,
        confirmed = CONFIRMED,
    )
}
