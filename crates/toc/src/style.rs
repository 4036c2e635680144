/// Companion stylesheet, injected once under `PanelConfig::style_id`.
pub const PANEL_CSS: &str = r#"
.zenn-scrap-toc {
  position: fixed;
  top: 80px;
  width: 280px;
  max-height: calc(100vh - 120px);
  display: flex;
  flex-direction: column;
  background: #fff;
  border: 1px solid #e4edf4;
  border-radius: 8px;
  box-shadow: 0 2px 8px rgba(0, 0, 0, 0.08);
  font-size: 13px;
  z-index: 1000;
}
.zenn-scrap-toc.position-right { right: 16px; }
.zenn-scrap-toc.position-left { left: 16px; }
.zenn-scrap-toc.compact { width: 220px; top: auto; bottom: 16px; }
.zenn-toc-header {
  display: flex;
  align-items: center;
  justify-content: space-between;
  padding: 8px 12px;
  border-bottom: 1px solid #e4edf4;
}
.zenn-toc-title { margin: 0; font-size: 14px; font-weight: 700; }
.zenn-toc-toggle { border: none; background: none; cursor: pointer; color: #65717b; }
.zenn-toc-content { overflow-y: auto; padding: 8px 0; }
.zenn-scrap-toc.collapsed .zenn-toc-content { display: none; }
.zenn-toc-list { list-style: none; margin: 0; padding: 0 0 0 12px; }
.zenn-toc-level-0 { padding-left: 4px; }
.zenn-toc-link {
  display: block;
  padding: 3px 8px;
  color: #3f4a54;
  text-decoration: none;
  border-left: 2px solid transparent;
}
.zenn-toc-link:hover { color: #3ea8ff; }
.zenn-toc-link.active { color: #3ea8ff; border-left-color: #3ea8ff; font-weight: 600; }
.zenn-toc-empty { padding: 8px 12px; color: #8f9faa; }
"#;
