use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, View};
use crate::content::{Block as TextBlock, BlockKind};
use crate::db::KeyValueStore;
use crate::models::{ArtifactCard, Rarity};
use crate::reader::progress::chapter_display_name;
use crate::reader::ChapterStatus;

pub fn draw<S: KeyValueStore>(frame: &mut Frame, app: &App<S>) {
    match app.view {
        View::Home => render_home(frame, app),
        View::Reader => render_reader(frame, app),
        View::Journey => render_journey(frame, app),
    }

    if let Some(artifact) = &app.celebration {
        render_celebration(frame, artifact);
    }

    if app.show_help {
        render_help(frame);
    }
}

fn render_home<S: KeyValueStore>(frame: &mut Frame, app: &App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Title and author
            Constraint::Length(3), // Progress
            Constraint::Min(0),    // Chapters
            Constraint::Length(1), // Key hints
        ])
        .split(frame.area());

    let header = vec![
        Line::styled(
            app.book.title.clone(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Line::styled(app.book.author.clone(), Style::default().fg(Color::Gray)),
        Line::styled(
            app.book.description.clone(),
            Style::default().fg(Color::DarkGray),
        ),
    ];
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let paragraph = Paragraph::new(header)
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, chunks[0]);

    let label = format!(
        "{}% · {}",
        app.saved_percent(),
        app.current_chapter_label()
    );
    let gauge = Gauge::default()
        .block(Block::default().title(" Progresso ").borders(Borders::ALL))
        .gauge_style(Style::default().fg(Color::Green))
        .percent(app.saved_percent() as u16)
        .label(label);
    frame.render_widget(gauge, chunks[1]);

    let items: Vec<ListItem> = app
        .chapters()
        .iter()
        .enumerate()
        .map(|(position, page)| {
            let (marker, style) = match app.chapter_status(position) {
                ChapterStatus::Completed => ("✓ ", Style::default().fg(Color::Green)),
                ChapterStatus::Current => ("▶ ", Style::default().fg(Color::Yellow)),
                ChapterStatus::Upcoming => ("  ", Style::default().fg(Color::White)),
            };
            let name = chapter_display_name(page.chapter_title.as_deref(), position + 1);
            ListItem::new(Line::from(vec![
                Span::styled(marker, style),
                Span::styled(name, style),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().title(" Capítulos ").borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(Some(app.chapter_selected));
    frame.render_stateful_widget(list, chunks[2], &mut state);

    let start = match &app.progress {
        Some(progress) if app.can_continue() => format!(
            "c:continuar (página {} · {}%)",
            progress.last_read_page + 1,
            app.saved_percent()
        ),
        _ => "c:começar".to_string(),
    };
    let status = format!(
        "{start}  j/k:capítulos  Enter:abrir  a:artefatos ({}/{})  ?:ajuda  q:sair",
        app.gamification.unlocked_count(),
        app.gamification.catalog().len()
    );
    let paragraph = Paragraph::new(status).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, chunks[3]);
}

fn render_reader<S: KeyValueStore>(frame: &mut Frame, app: &App<S>) {
    let area = frame.area();
    let (body_area, sidebar_area) = if app.show_bookmarks {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(area);
        (columns[0], Some(columns[1]))
    } else {
        (area, None)
    };

    if app.controls.is_visible() {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Chapter and page
                Constraint::Min(0),    // Page text
                Constraint::Length(1), // Progress
                Constraint::Length(1), // Key hints
            ])
            .split(body_area);
        render_reader_header(frame, app, rows[0]);
        render_page(frame, app, rows[1]);
        render_reader_progress(frame, app, rows[2]);
        render_reader_status(frame, app, rows[3]);
    } else {
        render_page(frame, app, body_area);
    }

    if let Some(sidebar) = sidebar_area {
        render_bookmarks(frame, app, sidebar);
    }
}

fn render_reader_header<S: KeyValueStore>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let page = app.current_page();
    let chapter = page
        .chapter_title
        .as_deref()
        .unwrap_or(app.book.title.as_str());
    let star = if app.is_bookmarked() { "★ " } else { "  " };

    let line = Line::from(vec![
        Span::styled(star, Style::default().fg(Color::Yellow)),
        Span::styled(
            chapter.to_string(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(
                "  Página {} / {}",
                app.navigator.index() + 1,
                app.navigator.len()
            ),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_page<S: KeyValueStore>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let page = app.current_page();
    if page.is_image_placeholder {
        let caption = match page.content.trim() {
            "" => "Ilustração",
            content => content,
        };
        let placeholder = Paragraph::new(vec![
            Line::default(),
            Line::styled(format!("[ {caption} ]"), Style::default().fg(Color::DarkGray)).centered(),
        ])
        .wrap(Wrap { trim: true });
        frame.render_widget(placeholder, inner);
        return;
    }

    let width = inner.width.saturating_sub(2).max(1) as usize;
    let active = app.cursor.active();
    let mut lines: Vec<Line> = Vec::new();
    let mut active_start = None;

    for (position, text_block) in app.blocks.iter().enumerate() {
        let is_active = active == Some(position);
        if is_active {
            active_start = Some(lines.len());
        }
        let mut style = block_style(text_block.kind);
        if app.transition.is_transitioning() || (active.is_some() && !is_active) {
            style = style.fg(Color::DarkGray);
        }
        if is_active {
            style = style.add_modifier(Modifier::BOLD);
        }
        lines.extend(block_lines(text_block, width, style));
        lines.push(Line::default());
    }

    let height = inner.height;
    let scroll = match active_start {
        Some(start) => {
            let start = start as u16;
            if start < app.scroll || start >= app.scroll.saturating_add(height) {
                start.saturating_sub(height / 3)
            } else {
                app.scroll
            }
        }
        None => app.scroll,
    };

    let paragraph = Paragraph::new(lines).scroll((scroll, 0));
    let text_area = Rect {
        x: inner.x + 1,
        width: inner.width.saturating_sub(2),
        ..inner
    };
    frame.render_widget(paragraph, text_area);
}

fn block_style(kind: BlockKind) -> Style {
    match kind {
        BlockKind::ChapterTitle => Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
        BlockKind::Subtitle => Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
        BlockKind::BlockQuote => Style::default()
            .fg(Color::Magenta)
            .add_modifier(Modifier::ITALIC),
        BlockKind::Dialogue => Style::default().fg(Color::White),
        BlockKind::NumberedListItem | BlockKind::BulletListItem => {
            Style::default().fg(Color::White)
        }
        BlockKind::Paragraph => Style::default().fg(Color::Gray),
    }
}

/// Wraps a block to `width` with a hanging indent for markers.
fn block_lines(text_block: &TextBlock, width: usize, style: Style) -> Vec<Line<'static>> {
    let (first, rest) = match text_block.kind {
        BlockKind::BlockQuote => ("│ ".to_string(), "│ ".to_string()),
        BlockKind::Dialogue if text_block.content.starts_with(['—', '-']) => {
            (String::new(), String::new())
        }
        BlockKind::Dialogue => ("— ".to_string(), "  ".to_string()),
        BlockKind::NumberedListItem | BlockKind::BulletListItem => {
            let marker = text_block.marker.as_deref().unwrap_or("•");
            let hang = " ".repeat(marker.chars().count() + 1);
            (format!("{marker} "), hang)
        }
        _ => (String::new(), String::new()),
    };

    let options = textwrap::Options::new(width)
        .wrap_algorithm(textwrap::WrapAlgorithm::FirstFit)
        .initial_indent(&first)
        .subsequent_indent(&rest);
    let centered = text_block.kind == BlockKind::ChapterTitle;

    textwrap::wrap(&text_block.content, options)
        .into_iter()
        .map(|segment| {
            let line = Line::styled(segment.into_owned(), style);
            if centered {
                line.centered()
            } else {
                line
            }
        })
        .collect()
}

fn render_reader_progress<S: KeyValueStore>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let percent = app.reading_percent();
    let label = format!("{}% · {} min de leitura", percent, app.reading_time());
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Green).bg(Color::Black))
        .percent(percent as u16)
        .label(label);
    frame.render_widget(gauge, area);
}

fn render_reader_status<S: KeyValueStore>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let speech = if app.narrator.is_paused() {
        "⏸ pausado"
    } else if app.narrator.is_reading() {
        "🔊 lendo"
    } else {
        ""
    };
    let prev = if app.navigator.is_first() { "" } else { "←:anterior  " };
    let next = if app.navigator.is_last() { "" } else { "→:seguinte  " };
    let text = format!(
        "{prev}{next}j/k:bloco  b:marcar  B:marcadores  espaço:ouvir  s:{}x {}  Esc:voltar",
        app.narrator.rate(),
        speech
    );
    let paragraph = Paragraph::new(text).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

fn render_bookmarks<S: KeyValueStore>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let block = Block::default()
        .title(" Marcadores ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    frame.render_widget(Clear, area);

    if app.bookmarks.is_empty() {
        let paragraph = Paragraph::new("Nenhum marcador ainda.\n\nPressione b para marcar a página.")
            .block(block)
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    }

    let width = area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = app
        .bookmarks
        .items()
        .iter()
        .map(|bookmark| {
            let mut lines = vec![Line::styled(
                bookmark.chapter_title.clone(),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )];
            lines.extend(
                textwrap::wrap(&bookmark.preview, width.max(1))
                    .into_iter()
                    .take(2)
                    .map(|l| Line::styled(l.into_owned(), Style::default().fg(Color::Gray))),
            );
            lines.push(Line::styled(
                bookmark.created_at.format("%d/%m/%Y %H:%M").to_string(),
                Style::default().fg(Color::DarkGray),
            ));
            ListItem::new(lines)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray));

    let mut state = ListState::default();
    state.select(Some(app.bookmark_selected));
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_journey<S: KeyValueStore>(frame: &mut Frame, app: &App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let title = format!(
        " Sua Jornada · {} / {} Artefatos ",
        app.gamification.unlocked_count(),
        app.gamification.catalog().len()
    );
    let header = Paragraph::new("Cada capítulo concluído revela um artefato.").block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow)),
    );
    frame.render_widget(header, chunks[0]);

    let artifacts = app.gamification.catalog().artifacts();
    let per_row = 4;
    let row_count = artifacts.len().div_ceil(per_row).max(1);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, row_count as u32); row_count])
        .split(chunks[1]);

    for (row, cards) in artifacts.chunks(per_row).enumerate() {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, per_row as u32); per_row])
            .split(rows[row]);
        for (cell, artifact) in cells.iter().zip(cards) {
            render_card(frame, artifact, app.gamification.is_unlocked(&artifact.id), *cell);
        }
    }

    let paragraph =
        Paragraph::new("Esc:voltar  ?:ajuda  q:sair").style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, chunks[2]);
}

fn render_card(frame: &mut Frame, artifact: &ArtifactCard, unlocked: bool, area: Rect) {
    if !unlocked {
        let card = Paragraph::new(vec![
            Line::default(),
            Line::from("???").centered(),
            Line::default(),
            Line::from("Continue lendo para descobrir este artefato.").centered(),
        ])
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL))
        .wrap(Wrap { trim: true });
        frame.render_widget(card, area);
        return;
    }

    let color = rarity_color(artifact.rarity);
    let lines = vec![
        Line::styled(
            format!("{} · {}", artifact.rarity.label(), artifact.archetype.label()),
            Style::default().fg(color),
        ),
        Line::default(),
        Line::styled(artifact.description.clone(), Style::default().fg(Color::Gray)),
    ];
    let card = Paragraph::new(lines)
        .block(
            Block::default()
                .title(format!(" {} ", artifact.title))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(card, area);
}

fn rarity_color(rarity: Rarity) -> Color {
    match rarity {
        Rarity::Common => Color::Gray,
        Rarity::Rare => Color::Blue,
        Rarity::Epic => Color::Magenta,
        Rarity::Legendary => Color::Yellow,
    }
}

fn render_celebration(frame: &mut Frame, artifact: &ArtifactCard) {
    let area = centered_rect(60, 50, frame.area());
    let color = rarity_color(artifact.rarity);

    let lines = vec![
        Line::default(),
        Line::styled("Artefato desbloqueado!", Style::default().fg(Color::White)).centered(),
        Line::default(),
        Line::styled(
            artifact.title.clone(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )
        .centered(),
        Line::styled(
            format!("{} · {}", artifact.rarity.label(), artifact.archetype.label()),
            Style::default().fg(color),
        )
        .centered(),
        Line::default(),
        Line::styled(artifact.description.clone(), Style::default().fg(Color::Gray)).centered(),
        Line::default(),
        Line::styled(
            "[ Enter ] Coletar Recompensa",
            Style::default()
                .fg(Color::Black)
                .bg(color)
                .add_modifier(Modifier::BOLD),
        )
        .centered(),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));
    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });

    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

fn render_help(frame: &mut Frame) {
    let area = centered_rect(50, 70, frame.area());

    let help_text = vec![
        "",
        " Início:",
        "   c / espaço  Começar ou continuar",
        "   j / k       Escolher capítulo",
        "   Enter       Abrir capítulo",
        "   a           Artefatos",
        "",
        " Leitura:",
        "   ← / →       Página anterior / seguinte",
        "   j / k       Destacar bloco",
        "   Ctrl-d/u    Rolar texto",
        "   b           Marcar página",
        "   B           Lista de marcadores",
        "   espaço      Ouvir / pausar",
        "   s           Velocidade da leitura",
        "   Esc         Voltar",
        "",
        " Geral:",
        "   ?           Esta ajuda",
        "   q           Sair",
        "",
        " Pressione qualquer tecla para fechar",
    ];

    let block = Block::default()
        .title(" Ajuda ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(help_text.join("\n"))
        .block(block)
        .style(Style::default().fg(Color::White));

    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
